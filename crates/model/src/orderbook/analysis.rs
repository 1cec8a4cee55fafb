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

//! Consolidation and fill-out analysis over one side of a book.
//!
//! All walkers traverse live levels in side order exactly once. Accumulation
//! is in `f64`; results are quantised back to the decimal tick of the last
//! consumed price level, so consumers see consistent price cohorts.

use bookcast_core::{NATV, UnixNanos};

use crate::{
    data::BookCell,
    enums::BookSide,
    orderbook::ladder::BookLadder,
    types::{Price, Quantity},
};

/// A partial fill-out aggregate over one side of a book.
///
/// `base` is the filled quantity, `term` the cash value paid for it
/// (`Σ price·qty`). `youngest`/`oldest` bracket the timestamps of the
/// levels consumed; with nothing consumed they stay at their initial
/// zero / [`NATV`] values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BookPdo {
    /// The filled base quantity.
    pub base: f64,
    /// The cash value of the fill (`Σ price·qty`).
    pub term: f64,
    /// The most recent timestamp among consumed levels.
    pub youngest: UnixNanos,
    /// The earliest timestamp among consumed levels.
    pub oldest: UnixNanos,
}

impl Default for BookPdo {
    fn default() -> Self {
        Self {
            base: 0.0,
            term: 0.0,
            youngest: UnixNanos::ZERO,
            oldest: NATV,
        }
    }
}

/// Consolidates one side out to `target` cumulative quantity.
///
/// Returns the VWAP price, the (quantised) target quantity and the last
/// consumed level's timestamp, or `None` when the side is too shallow.
pub(crate) fn consolidated_top(
    ladder: &BookLadder,
    target: f64,
) -> Option<(Price, Quantity, UnixNanos)> {
    let mut sum_qty = 0.0;
    let mut sum_value = 0.0;
    let mut last: Option<(Price, &BookCell)> = None;

    for (price, cell) in ladder.iter() {
        sum_qty += cell.qty.as_f64();
        sum_value += price.as_f64() * cell.qty.as_f64();
        last = Some((price, cell));
        if sum_qty >= target {
            break;
        }
    }

    if sum_qty < target {
        return None;
    }
    let (last_price, last_cell) = last?;

    // Back out the overshoot at the boundary level
    let value = sum_value - last_price.as_f64() * (sum_qty - target);
    Some((
        Price::new(value / target, last_price.precision),
        Quantity::new(target, last_price.precision),
        last_cell.ts,
    ))
}

/// Produces up to `n` successive consolidated levels in one pass.
///
/// Level `i` (1-based) consolidates out to cumulative quantity `i * target`.
pub(crate) fn consolidated_tops(
    ladder: &BookLadder,
    target: f64,
    n: usize,
) -> Vec<(Price, Quantity)> {
    let mut out = Vec::with_capacity(n);
    let mut it = ladder.iter();
    let mut sum_qty = 0.0;
    let mut sum_value = 0.0;
    let mut last: Option<Price> = None;

    for i in 1..=n {
        let cum_target = target * i as f64;
        while sum_qty < cum_target {
            let Some((price, cell)) = it.next() else {
                return out;
            };
            sum_qty += cell.qty.as_f64();
            sum_value += price.as_f64() * cell.qty.as_f64();
            last = Some(price);
        }
        let Some(last_price) = last else {
            return out;
        };
        let value = sum_value - last_price.as_f64() * (sum_qty - cum_target);
        out.push((
            Price::new(value / cum_target, last_price.precision),
            Quantity::new(cum_target, last_price.precision),
        ));
    }
    out
}

/// Consolidates one side out to `target` cumulative cash value.
///
/// The overshoot converts back to quantity at the boundary price, so the
/// returned `price * qty` equals the target value up to quantisation.
pub(crate) fn value_consolidated_top(
    ladder: &BookLadder,
    target: f64,
) -> Option<(Price, Quantity, UnixNanos)> {
    let mut sum_qty = 0.0;
    let mut sum_value = 0.0;
    let mut last: Option<(Price, &BookCell)> = None;

    for (price, cell) in ladder.iter() {
        sum_qty += cell.qty.as_f64();
        sum_value += price.as_f64() * cell.qty.as_f64();
        last = Some((price, cell));
        if sum_value >= target {
            break;
        }
    }

    if sum_value < target {
        return None;
    }
    let (last_price, last_cell) = last?;

    let qty = sum_qty - (sum_value - target) / last_price.as_f64();
    Some((
        Price::new(target / qty, last_price.precision),
        Quantity::new(qty, last_price.precision),
        last_cell.ts,
    ))
}

/// Produces up to `n` successive value-consolidated levels in one pass.
///
/// Level `i` (1-based) consolidates out to cumulative value `i * target`.
pub(crate) fn value_consolidated_tops(
    ladder: &BookLadder,
    target: f64,
    n: usize,
) -> Vec<(Price, Quantity)> {
    let mut out = Vec::with_capacity(n);
    let mut it = ladder.iter();
    let mut sum_qty = 0.0;
    let mut sum_value = 0.0;
    let mut last: Option<Price> = None;

    for i in 1..=n {
        let cum_target = target * i as f64;
        while sum_value < cum_target {
            let Some((price, cell)) = it.next() else {
                return out;
            };
            sum_qty += cell.qty.as_f64();
            sum_value += price.as_f64() * cell.qty.as_f64();
            last = Some(price);
        }
        let Some(last_price) = last else {
            return out;
        };
        let qty = sum_qty - (sum_value - cum_target) / last_price.as_f64();
        out.push((
            Price::new(cum_target / qty, last_price.precision),
            Quantity::new(qty, last_price.precision),
        ));
    }
    out
}

/// Walks one side filling out to `qty` while the price obeys `limit`.
///
/// An undefined limit is permissive (no price constraint). The ladder is
/// not modified.
pub(crate) fn fill_out(ladder: &BookLadder, qty: f64, limit: Price) -> BookPdo {
    let mut pdo = BookPdo::default();
    let mut remaining = qty;

    for (price, cell) in ladder.iter() {
        if remaining <= 0.0 {
            break;
        }
        if !limit.is_undef() {
            let breached = match ladder.side {
                BookSide::Ask => price > limit,
                BookSide::Bid => price < limit,
            };
            if breached {
                break;
            }
        }
        let take = cell.qty.as_f64().min(remaining);
        pdo.base += take;
        pdo.term += price.as_f64() * take;
        remaining -= take;
        pdo.youngest = pdo.youngest.max(cell.ts);
        pdo.oldest = pdo.oldest.min(cell.ts);
    }
    pdo
}
