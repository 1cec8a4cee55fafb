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

//! A two-sided price-ordered limit order book.

use std::fmt::Display;

use bookcast_core::{NATV, UnixNanos};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use super::analysis;
use crate::{
    data::{BookCell, BookQuote},
    enums::{BookSide, QuoteFlavour, QuoteSide},
    orderbook::{BookPdo, ladder::BookLadder},
    types::{Price, Quantity},
};

/// The result of applying a quote to a [`Book`].
///
/// `quote` is the applied quote with its quantity normalised to the new
/// stored total (relevant for L3 deltas, which may saturate); `prev` is the
/// pre-image of the touched cell, nil when no single cell was touched
/// (clears, deletes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedQuote {
    /// The applied quote, quantity normalised to the stored total.
    pub quote: BookQuote,
    /// The previous state of the touched cell.
    pub prev: BookCell,
}

/// Provides a two-sided price-ordered limit order book.
///
/// Maintains bid levels in descending and ask levels in ascending price
/// order, and implements the wire update semantics for level 1/2/3 quotes
/// plus the clear and delete (trade print) verbs. View operators derive
/// top-of-book, top-N, consolidated and value-consolidated quotes and
/// partial fill-out aggregates.
#[derive(Clone, Debug)]
pub struct Book {
    /// The timestamp of the last update applied to the book.
    pub ts_last: UnixNanos,
    /// The current count of updates applied to the book.
    pub update_count: u64,
    pub(crate) bids: BookLadder,
    pub(crate) asks: BookLadder,
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(bids={}, asks={}, update_count={})",
            stringify!(Book),
            self.bids.len(),
            self.asks.len(),
            self.update_count,
        )
    }
}

impl Book {
    /// Creates a new empty [`Book`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ts_last: UnixNanos::ZERO,
            update_count: 0,
            bids: BookLadder::new(BookSide::Bid),
            asks: BookLadder::new(BookSide::Ask),
        }
    }

    /// Returns the ladder for `side`.
    #[must_use]
    pub fn ladder(&self, side: BookSide) -> &BookLadder {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }

    fn ladder_mut(&mut self, side: BookSide) -> &mut BookLadder {
        match side {
            BookSide::Bid => &mut self.bids,
            BookSide::Ask => &mut self.asks,
        }
    }

    /// Removes all levels from both sides.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    /// Applies a wire quote, returning the pre-image of the touched cell.
    ///
    /// Returns `None` for invalid quotes (flavour `L0`, a negative L1
    /// quantity, or an undefined price where one is required); the book is
    /// left untouched in that case. Valid side-clearing quotes (`Clear`,
    /// `Delete`, L1 with an undefined price) return a nil pre-image.
    pub fn apply(&mut self, quote: BookQuote) -> Option<AppliedQuote> {
        let applied = match quote.side {
            QuoteSide::Clear => {
                self.clear();
                Some(AppliedQuote {
                    quote,
                    prev: BookCell::nil(),
                })
            }
            QuoteSide::Delete => {
                if quote.price.is_undef() {
                    return None;
                }
                self.apply_trade(quote);
                Some(AppliedQuote {
                    quote,
                    prev: BookCell::nil(),
                })
            }
            QuoteSide::Ask | QuoteSide::Bid => {
                let side = quote.side.as_book_side()?;
                match quote.flavour {
                    QuoteFlavour::L1 => self.apply_l1(side, quote),
                    QuoteFlavour::L2 => self.apply_l2(side, quote),
                    QuoteFlavour::L3 => self.apply_l3(side, quote),
                    QuoteFlavour::L0 => None,
                }
            }
        };

        if applied.is_some() {
            self.ts_last = quote.ts;
            self.update_count += 1;
        }
        applied
    }

    fn apply_l1(&mut self, side: BookSide, quote: BookQuote) -> Option<AppliedQuote> {
        if quote.qty.is_negative() {
            log::debug!("Dropping L1 quote with negative quantity: {quote}");
            return None;
        }
        if quote.price.is_undef() {
            // An undefined top means the side is gone
            self.ladder_mut(side).clear();
            return Some(AppliedQuote {
                quote,
                prev: BookCell::nil(),
            });
        }

        let ladder = self.ladder_mut(side);
        let cell = ladder.cell_mut(quote.price);
        let prev = *cell;
        *cell = BookCell::new(quote.qty, quote.ts);

        // Everything strictly better than the new top is implicitly gone
        let stale: Vec<Price> = ladder
            .iter()
            .take_while(|(price, _)| match side {
                BookSide::Ask => *price < quote.price,
                BookSide::Bid => *price > quote.price,
            })
            .map(|(price, _)| price)
            .collect();
        for price in stale {
            *ladder.cell_mut(price) = BookCell::new(Quantity::zero(0), quote.ts);
        }

        Some(AppliedQuote { quote, prev })
    }

    fn apply_l2(&mut self, side: BookSide, quote: BookQuote) -> Option<AppliedQuote> {
        if quote.price.is_undef() {
            return None;
        }
        let cell = self.ladder_mut(side).cell_mut(quote.price);
        let prev = *cell;
        *cell = BookCell::new(quote.qty.clamped_nonneg(), quote.ts);

        let mut quote = quote;
        quote.qty = cell.qty;
        Some(AppliedQuote { quote, prev })
    }

    fn apply_l3(&mut self, side: BookSide, quote: BookQuote) -> Option<AppliedQuote> {
        if quote.price.is_undef() {
            return None;
        }
        let cell = self.ladder_mut(side).cell_mut(quote.price);
        let prev = *cell;
        *cell = BookCell::new(prev.qty.saturating_add_signed(quote.qty), quote.ts);

        let mut quote = quote;
        quote.qty = cell.qty;
        Some(AppliedQuote { quote, prev })
    }

    /// A trade print at `price` consumed everything better on both sides:
    /// asks strictly below are zeroed, bids strictly above are zeroed, and
    /// levels exactly at the price lose the traded quantity.
    fn apply_trade(&mut self, quote: BookQuote) {
        for side in [BookSide::Ask, BookSide::Bid] {
            let ladder = self.ladder_mut(side);
            let touched: Vec<(Price, bool)> = ladder
                .iter()
                .take_while(|(price, _)| match side {
                    BookSide::Ask => *price <= quote.price,
                    BookSide::Bid => *price >= quote.price,
                })
                .map(|(price, _)| (price, price == quote.price))
                .collect();

            for (price, at_boundary) in touched {
                let cell = ladder.cell_mut(price);
                let qty = if at_boundary {
                    cell.qty.saturating_add_signed(-quote.qty)
                } else {
                    Quantity::zero(0)
                };
                *cell = BookCell::new(qty, quote.ts);
            }
        }
    }

    /// Resets every cell on either side with a timestamp at or before `t`.
    ///
    /// `t = 0` is a no-op; `t = NATV` clears the whole book.
    pub fn expire(&mut self, t: UnixNanos) {
        if t == UnixNanos::ZERO {
            return;
        }
        if t == NATV {
            self.clear();
            return;
        }
        for ladder in [&mut self.bids, &mut self.asks] {
            for cell in ladder.levels.values_mut() {
                if cell.ts <= t {
                    cell.qty = Quantity::zero(cell.qty.precision);
                }
            }
        }
    }

    /// Returns the best live level of `side` as an L1 quote.
    #[must_use]
    pub fn top(&self, side: BookSide) -> Option<BookQuote> {
        self.ladder(side).top().map(|(price, cell)| {
            BookQuote::new(
                side.as_quote_side(),
                QuoteFlavour::L1,
                price,
                cell.qty,
                cell.ts,
            )
        })
    }

    /// Returns up to `n` live levels of `side` in side order.
    #[must_use]
    pub fn tops(&self, side: BookSide, n: usize) -> Vec<(Price, Quantity)> {
        self.ladder(side)
            .iter()
            .take(n)
            .map(|(price, cell)| (price, cell.qty))
            .collect()
    }

    /// Returns the quote consolidating `side` out to `target` quantity, or
    /// `None` when the side is too shallow.
    #[must_use]
    pub fn ctop(&self, side: BookSide, target: Quantity) -> Option<BookQuote> {
        analysis::consolidated_top(self.ladder(side), target.as_f64()).map(|(price, qty, ts)| {
            BookQuote::new(side.as_quote_side(), QuoteFlavour::L1, price, qty, ts)
        })
    }

    /// Returns up to `n` successive consolidated levels of `side`, where
    /// level `i` (1-based) consolidates out to `i * target` quantity.
    #[must_use]
    pub fn ctops(&self, side: BookSide, target: Quantity, n: usize) -> Vec<(Price, Quantity)> {
        analysis::consolidated_tops(self.ladder(side), target.as_f64(), n)
    }

    /// Returns the quote consolidating `side` out to `target` cash value,
    /// or `None` when the side is too shallow.
    #[must_use]
    pub fn vtop(&self, side: BookSide, target: Quantity) -> Option<BookQuote> {
        analysis::value_consolidated_top(self.ladder(side), target.as_f64()).map(
            |(price, qty, ts)| {
                BookQuote::new(side.as_quote_side(), QuoteFlavour::L1, price, qty, ts)
            },
        )
    }

    /// Returns up to `n` successive value-consolidated levels of `side`.
    #[must_use]
    pub fn vtops(&self, side: BookSide, target: Quantity, n: usize) -> Vec<(Price, Quantity)> {
        analysis::value_consolidated_tops(self.ladder(side), target.as_f64(), n)
    }

    /// Walks `side` filling out to `qty` while the price obeys `limit`
    /// (undefined limit = no constraint). The book is not modified.
    #[must_use]
    pub fn pdo(&self, side: BookSide, qty: Quantity, limit: Price) -> BookPdo {
        analysis::fill_out(self.ladder(side), qty.as_f64(), limit)
    }

    /// Returns true if the book has any live bid level.
    #[must_use]
    pub fn has_bid(&self) -> bool {
        self.bids.top().is_some()
    }

    /// Returns true if the book has any live ask level.
    #[must_use]
    pub fn has_ask(&self) -> bool {
        self.asks.top().is_some()
    }

    /// Returns the best live bid price if available.
    #[must_use]
    pub fn best_bid_price(&self) -> Option<Price> {
        self.bids.top().map(|(price, _)| price)
    }

    /// Returns the best live ask price if available.
    #[must_use]
    pub fn best_ask_price(&self) -> Option<Price> {
        self.asks.top().map(|(price, _)| price)
    }

    /// Returns bid price levels as a map of price to size.
    #[must_use]
    pub fn bids_as_map(&self, depth: Option<usize>) -> IndexMap<Decimal, Decimal> {
        levels_as_map(&self.bids, depth)
    }

    /// Returns ask price levels as a map of price to size.
    #[must_use]
    pub fn asks_as_map(&self, depth: Option<usize>) -> IndexMap<Decimal, Decimal> {
        levels_as_map(&self.asks, depth)
    }
}

fn levels_as_map(ladder: &BookLadder, depth: Option<usize>) -> IndexMap<Decimal, Decimal> {
    ladder
        .iter()
        .take(depth.unwrap_or(usize::MAX))
        .map(|(price, cell)| (price.as_decimal(), cell.qty.as_decimal()))
        .collect()
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    use super::*;

    fn l2(side: QuoteSide, price: &str, qty: &str) -> BookQuote {
        BookQuote::new(
            side,
            QuoteFlavour::L2,
            Price::from(price),
            Quantity::from(qty),
            UnixNanos::ZERO,
        )
    }

    fn quote(side: QuoteSide, flavour: QuoteFlavour, price: &str, qty: &str) -> BookQuote {
        BookQuote::new(
            side,
            flavour,
            Price::from(price),
            Quantity::from(qty),
            UnixNanos::ZERO,
        )
    }

    /// Asks at 198@100, 200@300; bids at 197@300, 196@100.
    #[fixture]
    fn two_sided() -> Book {
        let mut book = Book::new();
        book.apply(l2(QuoteSide::Ask, "200.0", "300")).unwrap();
        book.apply(l2(QuoteSide::Ask, "198.0", "100")).unwrap();
        book.apply(l2(QuoteSide::Bid, "197.0", "300")).unwrap();
        book.apply(l2(QuoteSide::Bid, "196.0", "100")).unwrap();
        book
    }

    #[rstest]
    fn test_top(two_sided: Book) {
        let ask = two_sided.top(BookSide::Ask).unwrap();
        let bid = two_sided.top(BookSide::Bid).unwrap();
        assert_eq!(ask.price, Price::from("198.0"));
        assert_eq!(ask.qty, Quantity::from("100"));
        assert_eq!(bid.price, Price::from("197.0"));
        assert_eq!(bid.qty, Quantity::from("300"));
    }

    #[rstest]
    fn test_tops(mut two_sided: Book) {
        two_sided.apply(l2(QuoteSide::Ask, "197.0", "100")).unwrap();
        two_sided.apply(l2(QuoteSide::Bid, "198.0", "100")).unwrap();

        let asks = two_sided.tops(BookSide::Ask, 2);
        assert_eq!(
            asks,
            vec![
                (Price::from("197.0"), Quantity::from("100")),
                (Price::from("198.0"), Quantity::from("100")),
            ]
        );

        let bids = two_sided.tops(BookSide::Bid, 4);
        assert_eq!(
            bids,
            vec![
                (Price::from("198.0"), Quantity::from("100")),
                (Price::from("197.0"), Quantity::from("300")),
                (Price::from("196.0"), Quantity::from("100")),
            ]
        );
    }

    #[rstest]
    fn test_l2_pre_image(mut two_sided: Book) {
        let applied = two_sided
            .apply(l2(QuoteSide::Ask, "198.0", "250"))
            .unwrap();
        assert_eq!(applied.prev.qty, Quantity::from("100"));
        assert_eq!(applied.quote.qty, Quantity::from("250"));
    }

    #[rstest]
    fn test_l2_idempotent(mut two_sided: Book) {
        two_sided.apply(l2(QuoteSide::Ask, "198.0", "250")).unwrap();
        let again = two_sided
            .apply(l2(QuoteSide::Ask, "198.0", "250"))
            .unwrap();
        assert_eq!(again.prev.qty, Quantity::from("250"));
        assert_eq!(
            two_sided.top(BookSide::Ask).unwrap().qty,
            Quantity::from("250")
        );
    }

    #[rstest]
    fn test_l2_negative_saturates() {
        let mut book = Book::new();
        let applied = book.apply(l2(QuoteSide::Bid, "10.0", "-5")).unwrap();
        assert!(applied.quote.qty.is_zero());
        assert!(book.top(BookSide::Bid).is_none());
    }

    #[rstest]
    fn test_l3_delta_and_saturation() {
        let mut book = Book::new();
        book.apply(quote(QuoteSide::Ask, QuoteFlavour::L3, "1.23228", "0.5"))
            .unwrap();
        let applied = book
            .apply(quote(QuoteSide::Ask, QuoteFlavour::L3, "1.23228", "0.25"))
            .unwrap();
        assert_eq!(applied.prev.qty, Quantity::from("0.5"));
        assert_eq!(applied.quote.qty, Quantity::from("0.75"));

        // Repeated negative deltas never store a negative quantity
        for _ in 0..3 {
            let applied = book
                .apply(quote(QuoteSide::Ask, QuoteFlavour::L3, "1.23228", "-0.5"))
                .unwrap();
            assert!(!applied.quote.qty.is_negative());
        }
        assert!(book.top(BookSide::Ask).is_none());
    }

    #[rstest]
    fn test_l1_unwinds_stale_levels(mut two_sided: Book) {
        let applied = two_sided
            .apply(quote(QuoteSide::Ask, QuoteFlavour::L1, "199.0", "50"))
            .unwrap();
        assert!(applied.prev.is_nil());

        // 198.0 was strictly better than the new top and must be gone
        let top = two_sided.top(BookSide::Ask).unwrap();
        assert_eq!(top.price, Price::from("199.0"));
        assert_eq!(top.qty, Quantity::from("50"));
        let live: Vec<Price> = two_sided
            .ladder(BookSide::Ask)
            .iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(live, vec![Price::from("199.0"), Price::from("200.0")]);
    }

    #[rstest]
    fn test_l1_negative_qty_invalid(mut two_sided: Book) {
        let before = two_sided.update_count;
        assert!(
            two_sided
                .apply(quote(QuoteSide::Bid, QuoteFlavour::L1, "197.0", "-1"))
                .is_none()
        );
        assert_eq!(two_sided.update_count, before);
    }

    #[rstest]
    fn test_l1_undef_price_clears_side(mut two_sided: Book) {
        let applied = two_sided
            .apply(BookQuote::new(
                QuoteSide::Ask,
                QuoteFlavour::L1,
                Price::undef(),
                Quantity::zero(0),
                UnixNanos::ZERO,
            ))
            .unwrap();
        assert!(applied.prev.is_nil());
        assert!(!two_sided.has_ask());
        assert!(two_sided.has_bid());
    }

    #[rstest]
    fn test_l0_invalid(mut two_sided: Book) {
        assert!(
            two_sided
                .apply(quote(QuoteSide::Ask, QuoteFlavour::L0, "198.0", "1"))
                .is_none()
        );
    }

    #[rstest]
    fn test_clear_verb(mut two_sided: Book) {
        let applied = two_sided
            .apply(quote(QuoteSide::Clear, QuoteFlavour::L0, "0", "0"))
            .unwrap();
        assert!(applied.prev.is_nil());
        assert!(!two_sided.has_bid());
        assert!(!two_sided.has_ask());
    }

    #[rstest]
    fn test_trade_print_consumes_levels(mut two_sided: Book) {
        // A trade at 198 consumes the 198 ask partially and the crossed bids
        two_sided
            .apply(quote(QuoteSide::Delete, QuoteFlavour::L0, "198.0", "40"))
            .unwrap();

        let ask = two_sided.top(BookSide::Ask).unwrap();
        assert_eq!(ask.price, Price::from("198.0"));
        assert_eq!(ask.qty, Quantity::from("60"));
        // Bids at 197/196 are below the trade price and untouched
        assert_eq!(
            two_sided.top(BookSide::Bid).unwrap().price,
            Price::from("197.0")
        );
    }

    #[rstest]
    fn test_trade_print_zeroes_crossed_levels(mut two_sided: Book) {
        // A trade at 199 wipes the 198 ask entirely
        two_sided
            .apply(quote(QuoteSide::Delete, QuoteFlavour::L0, "199.0", "10"))
            .unwrap();
        assert_eq!(
            two_sided.top(BookSide::Ask).unwrap().price,
            Price::from("200.0")
        );
        // Bids at 199 or better would be gone; 197 is not
        assert_eq!(
            two_sided.top(BookSide::Bid).unwrap().price,
            Price::from("197.0")
        );
    }

    #[rstest]
    fn test_monotone_top_invariant(mut two_sided: Book) {
        two_sided.apply(l2(QuoteSide::Bid, "196.5", "10")).unwrap();
        two_sided.apply(l2(QuoteSide::Bid, "197.0", "0")).unwrap();

        let top = two_sided.top(BookSide::Bid).unwrap();
        for (price, cell) in two_sided.ladder(BookSide::Bid).iter() {
            assert!(cell.qty.is_positive());
            assert!(price <= top.price);
        }
    }

    #[rstest]
    fn test_ctop_exact_boundary(two_sided: Book) {
        // S = 198*100 + 200*300 = 79800, VWAP = 79800/400 = 199.5
        let quote = two_sided
            .ctop(BookSide::Ask, Quantity::from("400"))
            .unwrap();
        assert_eq!(quote.price, Price::from("199.5"));
        assert_eq!(quote.qty, Quantity::from("400.0"));
    }

    #[rstest]
    fn test_ctop_partial_boundary(two_sided: Book) {
        // 100 @ 198 plus 100 of the 300 resting at 200
        let quote = two_sided
            .ctop(BookSide::Ask, Quantity::from("200"))
            .unwrap();
        assert_eq!(quote.price, Price::from("199.0"));
        assert_eq!(quote.qty, Quantity::from("200"));
    }

    #[rstest]
    fn test_ctop_insufficient_depth(two_sided: Book) {
        assert!(two_sided.ctop(BookSide::Ask, Quantity::from("401")).is_none());
        assert!(two_sided.ctop(BookSide::Bid, Quantity::from("500")).is_none());
    }

    #[rstest]
    fn test_ctops_successive_levels(two_sided: Book) {
        let levels = two_sided.ctops(BookSide::Ask, Quantity::from("100"), 4);
        assert_eq!(levels.len(), 4);
        // Level 1: 100 @ 198
        assert_eq!(levels[0], (Price::from("198.0"), Quantity::from("100.0")));
        // Level 2: 100 @ 198 + 100 @ 200 -> 199
        assert_eq!(levels[1], (Price::from("199.0"), Quantity::from("200.0")));
        // Level 4: the full 400 -> 199.5
        assert_eq!(levels[3], (Price::from("199.5"), Quantity::from("400.0")));

        // A fifth level would need 500 but only 400 rests
        let truncated = two_sided.ctops(BookSide::Ask, Quantity::from("100"), 5);
        assert_eq!(truncated.len(), 4);
    }

    #[rstest]
    fn test_vtop_identity(two_sided: Book) {
        // Value target inside the first level: 9900 = 198 * 50
        let quote = two_sided
            .vtop(BookSide::Ask, Quantity::from("9900"))
            .unwrap();
        assert_eq!(quote.price, Price::from("198.0"));
        assert_eq!(quote.qty, Quantity::from("50.0"));

        // price * qty returns the target value up to quantisation
        let product = quote.price.as_f64() * quote.qty.as_f64();
        assert!((product - 9_900.0).abs() < 1e-6);
    }

    #[rstest]
    fn test_vtop_across_levels(two_sided: Book) {
        // 198*100 = 19800, plus 200*100 = 20000 more reaches 39800
        let quote = two_sided
            .vtop(BookSide::Ask, Quantity::from("39800"))
            .unwrap();
        assert_eq!(quote.qty, Quantity::from("200.0"));
        assert_eq!(quote.price, Price::from("199.0"));
        assert!(
            two_sided
                .vtop(BookSide::Ask, Quantity::from("79801"))
                .is_none()
        );
    }

    #[rstest]
    fn test_vtops_successive_levels(two_sided: Book) {
        let levels = two_sided.vtops(BookSide::Ask, Quantity::from("19800"), 2);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0], (Price::from("198.0"), Quantity::from("100.0")));
        // Level 2: cumulative value 39600, 99 more units at 200
        assert_eq!(levels[1].1, Quantity::from("199.0"));
    }

    #[rstest]
    fn test_pdo(two_sided: Book) {
        let f1 = two_sided.pdo(BookSide::Ask, Quantity::from("200"), Price::undef());
        assert_eq!((f1.base, f1.term), (200.0, 39_800.0));

        let f2 = two_sided.pdo(BookSide::Ask, Quantity::from("500"), Price::from("205.0"));
        assert_eq!((f2.base, f2.term), (400.0, 79_800.0));

        let f3 = two_sided.pdo(BookSide::Bid, Quantity::from("100"), Price::undef());
        assert_eq!((f3.base, f3.term), (100.0, 19_700.0));

        let f4 = two_sided.pdo(BookSide::Bid, Quantity::from("400"), Price::from("197.0"));
        assert_eq!((f4.base, f4.term), (300.0, 59_100.0));
    }

    #[rstest]
    fn test_pdo_timestamps() {
        let mut book = Book::new();
        book.apply(BookQuote::new(
            QuoteSide::Ask,
            QuoteFlavour::L2,
            Price::from("10.0"),
            Quantity::from("5"),
            UnixNanos::from(100),
        ))
        .unwrap();
        book.apply(BookQuote::new(
            QuoteSide::Ask,
            QuoteFlavour::L2,
            Price::from("11.0"),
            Quantity::from("5"),
            UnixNanos::from(50),
        ))
        .unwrap();

        let pdo = book.pdo(BookSide::Ask, Quantity::from("10"), Price::undef());
        assert_eq!(pdo.youngest, UnixNanos::from(100));
        assert_eq!(pdo.oldest, UnixNanos::from(50));
    }

    #[rstest]
    fn test_expire(mut two_sided: Book) {
        // Rebuild with staggered timestamps
        let mut book = Book::new();
        for (side, price, qty, ts) in [
            (QuoteSide::Ask, "198.0", "100", 10u64),
            (QuoteSide::Ask, "200.0", "300", 20),
            (QuoteSide::Bid, "197.0", "300", 30),
        ] {
            book.apply(BookQuote::new(
                side,
                QuoteFlavour::L2,
                Price::from(price),
                Quantity::from(qty),
                UnixNanos::from(ts),
            ))
            .unwrap();
        }

        book.expire(UnixNanos::from(20));
        assert!(book.top(BookSide::Ask).is_none());
        assert!(book.has_bid());

        // t = 0 is a no-op, NATV clears everything
        two_sided.expire(UnixNanos::ZERO);
        assert!(two_sided.has_bid());
        two_sided.expire(NATV);
        assert!(!two_sided.has_bid() && !two_sided.has_ask());
    }

    #[rstest]
    fn test_as_map(two_sided: Book) {
        let bids = two_sided.bids_as_map(None);
        assert_eq!(bids[&dec!(197.0)], dec!(300));
        let asks = two_sided.asks_as_map(Some(1));
        assert_eq!(asks.len(), 1);
        assert_eq!(asks[&dec!(198.0)], dec!(100));
    }
}
