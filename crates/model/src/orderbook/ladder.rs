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

//! Represents a ladder of price levels for one side of an order book.
//!
//! This is the ordered price map of the book: a balanced map from a decimal
//! price key to a `(quantity, timestamp)` cell, iterated in the side's
//! natural order (bid descending, ask ascending). The balanced-structure
//! choice is not observable; a `BTreeMap` delivers the required O(log n)
//! point operations and in-order traversal.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt::{Debug, Display},
};

use crate::{
    data::BookCell,
    enums::BookSide,
    types::{Price, Quantity},
};

/// Represents a price with a specified side in an order book's ladder.
///
/// # Comparison Semantics
///
/// `BookPrice` instances are only meaningfully compared within the same side
/// (i.e., within a single `BookLadder`). Cross-side comparisons are not
/// expected in normal use, as bid and ask ladders maintain separate
/// `BTreeMap<BookPrice, BookCell>` collections.
///
/// - Equality requires both `value` and `side` to match.
/// - Ordering is side-dependent: Bid side sorts descending, Ask side ascending.
#[derive(Clone, Copy, Debug, Eq)]
pub struct BookPrice {
    pub value: Price,
    pub side: BookSide,
}

impl BookPrice {
    /// Creates a new [`BookPrice`] instance.
    #[must_use]
    pub fn new(value: Price, side: BookSide) -> Self {
        Self { value, side }
    }
}

impl PartialOrd for BookPrice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for BookPrice {
    fn eq(&self, other: &Self) -> bool {
        self.side == other.side && self.value == other.value
    }
}

impl Ord for BookPrice {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert_eq!(
            self.side, other.side,
            "BookPrice compared across sides: {:?} vs {:?}",
            self.side, other.side
        );

        match self.side {
            BookSide::Bid => other.value.cmp(&self.value),
            BookSide::Ask => self.value.cmp(&other.value),
        }
    }
}

impl Display for BookPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Represents a ladder of price levels for one side of an order book.
///
/// Cells zeroed by updates may stay physically present; every view accessor
/// gates on a positive quantity, while [`BookLadder::iter_raw`] exposes the
/// materialised state.
#[derive(Clone, Debug)]
pub struct BookLadder {
    pub side: BookSide,
    pub(crate) levels: BTreeMap<BookPrice, BookCell>,
}

impl BookLadder {
    /// Creates a new [`BookLadder`] instance.
    #[must_use]
    pub fn new(side: BookSide) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Returns the number of price levels in the ladder (nil cells included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if the ladder has no price levels materialised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Removes all price levels from the ladder.
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    fn key(&self, price: Price) -> BookPrice {
        BookPrice::new(price, self.side)
    }

    /// Returns the cell stored at `price`, if materialised.
    #[must_use]
    pub fn get(&self, price: Price) -> Option<&BookCell> {
        self.levels.get(&self.key(price))
    }

    /// Returns a mutable handle to the cell at `price`, inserting a nil cell
    /// if the level is absent.
    pub fn cell_mut(&mut self, price: Price) -> &mut BookCell {
        self.levels.entry(self.key(price)).or_default()
    }

    /// Detaches and returns the cell at `price`; absent levels yield nil.
    pub fn remove(&mut self, price: Price) -> BookCell {
        self.levels.remove(&self.key(price)).unwrap_or_default()
    }

    /// Returns the best live level, i.e. the first cell in side order with a
    /// positive quantity.
    #[must_use]
    pub fn top(&self) -> Option<(Price, BookCell)> {
        self.iter().next().map(|(price, cell)| (price, *cell))
    }

    /// Iterates live levels (positive quantity) in side order.
    pub fn iter(&self) -> impl Iterator<Item = (Price, &BookCell)> {
        self.iter_raw().filter(|(_, cell)| cell.qty.is_positive())
    }

    /// Iterates all materialised levels in side order, nil cells included.
    pub fn iter_raw(&self) -> impl Iterator<Item = (Price, &BookCell)> {
        self.levels.iter().map(|(bp, cell)| (bp.value, cell))
    }

    /// Returns the total live quantity resting in the ladder.
    #[must_use]
    pub fn sizes(&self) -> f64 {
        self.iter().map(|(_, cell)| cell.qty.as_f64()).sum()
    }

    /// Returns the total live value exposure (price * quantity) in the ladder.
    #[must_use]
    pub fn exposures(&self) -> f64 {
        self.iter()
            .map(|(price, cell)| price.as_f64() * cell.qty.as_f64())
            .sum()
    }
}

impl Display for BookLadder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}(side={})", stringify!(BookLadder), self.side)?;
        for (price, cell) in self.iter() {
            writeln!(f, "  {} -> {} @ {}", price, cell.qty, cell.ts)?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl BookLadder {
    /// Stores `(price, qty)` pairs at timestamp zero.
    pub fn set_bulk(&mut self, levels: &[(&str, &str)]) {
        use bookcast_core::UnixNanos;
        for (price, qty) in levels {
            *self.cell_mut(Price::from(*price)) =
                BookCell::new(Quantity::from(*qty), UnixNanos::ZERO);
        }
    }
}
