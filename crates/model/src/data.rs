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

//! Data types flowing through the book: wire quotes and stored cells.

use std::fmt::Display;

use bookcast_core::UnixNanos;
use serde::{Deserialize, Serialize};

use crate::{
    enums::{BookSide, QuoteFlavour, QuoteSide},
    types::{Price, Quantity},
};

/// A single book update (or derived view quote).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookQuote {
    /// The side or verb of the update.
    pub side: QuoteSide,
    /// The update convention.
    pub flavour: QuoteFlavour,
    /// The price level (may be undefined, the wire `nan`).
    pub price: Price,
    /// The quantity: absolute for L1/L2, a signed delta for L3.
    pub qty: Quantity,
    /// The event timestamp.
    pub ts: UnixNanos,
}

impl BookQuote {
    /// Creates a new [`BookQuote`] instance.
    #[must_use]
    pub fn new(
        side: QuoteSide,
        flavour: QuoteFlavour,
        price: Price,
        qty: Quantity,
        ts: UnixNanos,
    ) -> Self {
        Self {
            side,
            flavour,
            price,
            qty,
            ts,
        }
    }

    /// A synthetic level-2 quote setting `price` to `qty` on `side`.
    ///
    /// The converter uses these to spell out implicit removals (level-1
    /// unwinding, clears, trade deletions) for per-level consumers.
    #[must_use]
    pub fn synthetic_l2(side: BookSide, price: Price, qty: Quantity, ts: UnixNanos) -> Self {
        Self {
            side: side.as_quote_side(),
            flavour: QuoteFlavour::L2,
            price,
            qty,
            ts,
        }
    }
}

impl Display for BookQuote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({},{},{},{},{})",
            stringify!(BookQuote),
            self.side,
            self.flavour,
            self.price,
            self.qty,
            self.ts,
        )
    }
}

/// A stored `(quantity, timestamp)` cell at one price level.
///
/// A cell with non-positive quantity is "nil for viewing": it may stay
/// physically present in the ladder, but no view operator reports it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookCell {
    /// The resting quantity at the level.
    pub qty: Quantity,
    /// The timestamp of the last update to the level.
    pub ts: UnixNanos,
}

impl BookCell {
    /// Creates a new [`BookCell`] instance.
    #[must_use]
    pub fn new(qty: Quantity, ts: UnixNanos) -> Self {
        Self { qty, ts }
    }

    /// The nil cell.
    #[must_use]
    pub const fn nil() -> Self {
        Self {
            qty: Quantity::zero(0),
            ts: UnixNanos::ZERO,
        }
    }

    /// Returns true if the cell is nil for viewing purposes.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        !self.qty.is_positive()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_synthetic_l2() {
        let quote = BookQuote::synthetic_l2(
            BookSide::Ask,
            Price::from("198.0"),
            Quantity::zero(0),
            UnixNanos::from(7),
        );
        assert_eq!(quote.side, QuoteSide::Ask);
        assert_eq!(quote.flavour, QuoteFlavour::L2);
        assert!(quote.qty.is_zero());
    }

    #[rstest]
    fn test_cell_nil() {
        assert!(BookCell::nil().is_nil());
        assert!(BookCell::new(Quantity::zero(3), UnixNanos::from(1)).is_nil());
        assert!(!BookCell::new(Quantity::from(5u64), UnixNanos::from(1)).is_nil());
    }
}
