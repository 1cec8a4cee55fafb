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

//! The converter view emitters.
//!
//! Each emitter writes `prefix` followed by a view record. The per-level
//! emitters ([`Emitter::Raw2`], [`Emitter::Delta3`]) report every applied
//! update; the aligned emitters recompute their view from the book and are
//! change-gated against the cache on the book handle, so an update that does
//! not move the view emits nothing.

use std::io::{self, Write};

use bookcast_model::{
    enums::BookSide,
    orderbook::AppliedQuote,
    types::{Price, Quantity},
};

use crate::registry::ViewBook;

/// The configured output view of the converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emitter {
    /// Raw level-2: one record per updated level.
    Raw2,
    /// Level-3 deltas: one signed quantity change per updated level.
    Delta3,
    /// Aligned top-of-book.
    Top1,
    /// Aligned top-N books.
    TopN {
        /// Number of levels per side.
        depth: usize,
    },
    /// Quantity-consolidated top.
    Consolidated {
        /// Consolidation quantity target.
        target: Quantity,
    },
    /// Quantity-consolidated top-N.
    ConsolidatedN {
        /// Consolidation quantity target per level.
        target: Quantity,
        /// Number of levels per side.
        depth: usize,
    },
    /// Value-consolidated top.
    Value {
        /// Consolidation cash-value target.
        target: Quantity,
    },
    /// Value-consolidated top-N.
    ValueN {
        /// Consolidation cash-value target per level.
        target: Quantity,
        /// Number of levels per side.
        depth: usize,
    },
}

impl Emitter {
    /// Per-level emitters need implicit removals spelled out by the stream
    /// loop (level-1 unwinding, clear and trade expansion).
    #[must_use]
    pub const fn is_per_level(&self) -> bool {
        matches!(self, Self::Raw2 | Self::Delta3)
    }

    /// Emits the view for one applied update.
    ///
    /// # Errors
    ///
    /// Returns any error from the output sink.
    pub fn emit<W: Write>(
        &self,
        view: &mut ViewBook,
        applied: &AppliedQuote,
        prefix: &[u8],
        out: &mut W,
    ) -> io::Result<()> {
        match self {
            Self::Raw2 => {
                let quote = applied.quote;
                let Some(side) = quote.side.as_book_side() else {
                    return Ok(());
                };
                out.write_all(prefix)?;
                writeln!(out, "{}2\t{}\t{}", side.wire_char(), quote.price, quote.qty)
            }
            Self::Delta3 => {
                let quote = applied.quote;
                let Some(side) = quote.side.as_book_side() else {
                    return Ok(());
                };
                let delta = quote.qty - applied.prev.qty;
                out.write_all(prefix)?;
                writeln!(out, "{}3\t{}\t{}", side.wire_char(), quote.price, delta)
            }
            Self::Top1 => {
                let bid = view.book.top(BookSide::Bid).map(|q| (q.price, q.qty));
                let ask = view.book.top(BookSide::Ask).map(|q| (q.price, q.qty));
                if bid == view.cache.bid_top && ask == view.cache.ask_top {
                    return Ok(());
                }
                view.cache.bid_top = bid;
                view.cache.ask_top = ask;
                write_combined_row(out, prefix, "c1", bid, ask)
            }
            Self::TopN { depth } => {
                let bids = view.book.tops(BookSide::Bid, *depth);
                let asks = view.book.tops(BookSide::Ask, *depth);
                if bids == view.cache.bids && asks == view.cache.asks {
                    return Ok(());
                }
                write_depth_rows(out, prefix, &bids, &asks)?;
                view.cache.bids = bids;
                view.cache.asks = asks;
                Ok(())
            }
            Self::Consolidated { target } => {
                let bid = view.book.ctop(BookSide::Bid, *target).map(|q| (q.price, q.qty));
                let ask = view.book.ctop(BookSide::Ask, *target).map(|q| (q.price, q.qty));
                emit_consolidated(view, bid, ask, prefix, out)
            }
            Self::Value { target } => {
                let bid = view.book.vtop(BookSide::Bid, *target).map(|q| (q.price, q.qty));
                let ask = view.book.vtop(BookSide::Ask, *target).map(|q| (q.price, q.qty));
                emit_consolidated(view, bid, ask, prefix, out)
            }
            Self::ConsolidatedN { target, depth } => {
                let bids = view.book.ctops(BookSide::Bid, *target, *depth);
                let asks = view.book.ctops(BookSide::Ask, *target, *depth);
                emit_consolidated_depth(view, bids, asks, prefix, out)
            }
            Self::ValueN { target, depth } => {
                let bids = view.book.vtops(BookSide::Bid, *target, *depth);
                let asks = view.book.vtops(BookSide::Ask, *target, *depth);
                emit_consolidated_depth(view, bids, asks, prefix, out)
            }
        }
    }
}

/// Consolidated views gate on the prices only: a size change at unchanged
/// VWAP is not a view change.
fn emit_consolidated<W: Write>(
    view: &mut ViewBook,
    bid: Option<(Price, Quantity)>,
    ask: Option<(Price, Quantity)>,
    prefix: &[u8],
    out: &mut W,
) -> io::Result<()> {
    let bid_px = bid.map(|(p, _)| p);
    let ask_px = ask.map(|(p, _)| p);
    if bid_px == view.cache.bid_px && ask_px == view.cache.ask_px {
        return Ok(());
    }
    view.cache.bid_px = bid_px;
    view.cache.ask_px = ask_px;
    write_combined_row(out, prefix, "c1", bid, ask)
}

fn emit_consolidated_depth<W: Write>(
    view: &mut ViewBook,
    bids: Vec<(Price, Quantity)>,
    asks: Vec<(Price, Quantity)>,
    prefix: &[u8],
    out: &mut W,
) -> io::Result<()> {
    let unchanged = |a: &[(Price, Quantity)], b: &[(Price, Quantity)]| {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.0 == y.0)
    };
    if unchanged(&bids, &view.cache.bids) && unchanged(&asks, &view.cache.asks) {
        return Ok(());
    }
    write_depth_rows(out, prefix, &bids, &asks)?;
    view.cache.bids = bids;
    view.cache.asks = asks;
    Ok(())
}

/// Writes one combined `TAG\tbid_p\task_p\tbid_q\task_q` record with blank
/// columns for missing sides.
pub(crate) fn write_combined_row<W: Write>(
    out: &mut W,
    prefix: &[u8],
    tag: &str,
    bid: Option<(Price, Quantity)>,
    ask: Option<(Price, Quantity)>,
) -> io::Result<()> {
    out.write_all(prefix)?;
    write!(out, "{tag}\t")?;
    if let Some((price, _)) = bid {
        write!(out, "{price}")?;
    }
    out.write_all(b"\t")?;
    if let Some((price, _)) = ask {
        write!(out, "{price}")?;
    }
    out.write_all(b"\t")?;
    if let Some((_, qty)) = bid {
        write!(out, "{qty}")?;
    }
    out.write_all(b"\t")?;
    if let Some((_, qty)) = ask {
        write!(out, "{qty}")?;
    }
    out.write_all(b"\n")
}

/// Writes `c<i>` rows out to the deeper side, blank columns for the
/// shallower one.
pub(crate) fn write_depth_rows<W: Write>(
    out: &mut W,
    prefix: &[u8],
    bids: &[(Price, Quantity)],
    asks: &[(Price, Quantity)],
) -> io::Result<()> {
    let n = bids.len().max(asks.len());
    for i in 0..n {
        out.write_all(prefix)?;
        write!(out, "c{}\t", i + 1)?;
        if let Some((price, _)) = bids.get(i) {
            write!(out, "{price}")?;
        }
        out.write_all(b"\t")?;
        if let Some((price, _)) = asks.get(i) {
            write!(out, "{price}")?;
        }
        out.write_all(b"\t")?;
        if let Some((_, qty)) = bids.get(i) {
            write!(out, "{qty}")?;
        }
        out.write_all(b"\t")?;
        if let Some((_, qty)) = asks.get(i) {
            write!(out, "{qty}")?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}
