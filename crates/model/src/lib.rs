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

//! Limit-order-book domain model for bookcast.
//!
//! Provides the price-ordered ladder, the two-sided book with its update
//! semantics (level 1/2/3 plus the clear and delete verbs), and the derived
//! views: top-of-book, top-N, quantity-consolidated and value-consolidated
//! quotes, and partial fill-out aggregates.
//!
//! # Feature flags
//!
//! - `high-precision`: widens the fixed-point raw representation from 64-bit
//!   to 128-bit, raising the maximum decimal precision from 9 to 16.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod data;
pub mod enums;
pub mod orderbook;
pub mod types;

// Re-exports
pub use data::{BookCell, BookQuote};
pub use enums::{BookSide, QuoteFlavour, QuoteSide};
pub use orderbook::{AppliedQuote, Book, BookPdo};
pub use types::{Price, Quantity};
