// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Value types for the order-book domain model.
//!
//! This module provides the immutable [`Price`] and [`Quantity`] value types.
//! Both use fixed-point arithmetic internally for deterministic calculations:
//! the raw value is scaled to [`fixed::FIXED_PRECISION`] decimal places while
//! a `precision` field records how many fraction digits the source text
//! carried (its trailing-zero cohort), so values render back exactly as they
//! arrived on the wire.
//!
//! Equality and ordering ignore the cohort: `200.0` and `200.00` are the same
//! key. [`Price`] additionally has an undefined sentinel standing in for the
//! wire `nan`.

pub mod fixed;
pub mod price;
pub mod quantity;

// Re-exports
pub use price::{PRICE_MAX, PRICE_MIN, PRICE_UNDEF, Price, PriceRaw};
pub use quantity::{QUANTITY_MAX, QUANTITY_MIN, Quantity, QuantityRaw};
