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

//! The converter stream loop.
//!
//! One pass over the input: parse, route, mutate the instrument's book, emit
//! the configured view. Invalid lines and unknown instruments are dropped
//! without failing the stream; a trailing partial line (no newline at EOF)
//! is dropped silently.
//!
//! Per-level emitters see implicit removals spelled out: a level-1 update
//! first emits synthetic level-2 zeros for every level it obsoletes, a clear
//! emits zeros for every live level of both sides, and a trade print emits
//! the per-level remainders it leaves behind. Each synthetic record is
//! applied to the book before it is emitted, so pre-images stay truthful.

use std::io::{self, BufRead, Write};

use bookcast_model::{
    data::BookQuote,
    enums::{BookSide, QuoteFlavour, QuoteSide},
    types::{Price, Quantity},
};

use crate::{emit::Emitter, registry::BookRegistry, xquo::parse_quote};

/// Converter configuration threaded through the stream loop.
#[derive(Clone, Copy, Debug)]
pub struct ConvertConfig {
    /// The configured output view.
    pub emitter: Emitter,
    /// Resolve self-crossed books by zeroing the older top (historical
    /// policy, applies to the aligned top-of-book view only).
    pub uncross: bool,
}

/// Runs the converter over `input`, writing view records to `out`.
///
/// # Errors
///
/// Returns any error from the output sink; input lines never fail the run.
pub fn run_convert<R: BufRead, W: Write>(
    config: &ConvertConfig,
    registry: &mut BookRegistry,
    mut input: R,
    mut out: W,
) -> io::Result<()> {
    let mut line = Vec::new();

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if !line.ends_with(b"\n") {
            // Partial line at EOF
            break;
        }

        let Ok(parsed) = parse_quote(&line) else {
            continue;
        };
        let Some(idx) = registry.lookup(parsed.instrument) else {
            continue;
        };
        let prefix = &line[..parsed.prefix_len];
        let quote = parsed.quote;

        if config.emitter.is_per_level() {
            match expand_implicit_removals(config, registry, idx, quote, prefix, &mut out)? {
                Expansion::Consumed => continue,
                Expansion::Continue => {}
            }
        }

        let view = registry.view_mut(idx);
        let Some(applied) = view.book.apply(quote) else {
            continue;
        };
        config.emitter.emit(view, &applied, prefix, &mut out)?;

        if config.uncross && config.emitter == Emitter::Top1 {
            uncross(config, registry, idx, prefix, &mut out)?;
        }
    }

    out.flush()
}

enum Expansion {
    /// The quote was fully handled by its expansion.
    Consumed,
    /// Proceed to the normal apply-and-emit path.
    Continue,
}

/// Spells out the implicit removals of side-clearing quotes for per-level
/// consumers.
fn expand_implicit_removals<W: Write>(
    config: &ConvertConfig,
    registry: &mut BookRegistry,
    idx: usize,
    quote: BookQuote,
    prefix: &[u8],
    out: &mut W,
) -> io::Result<Expansion> {
    match quote.side {
        QuoteSide::Clear => {
            for side in [BookSide::Bid, BookSide::Ask] {
                zero_levels(config, registry, idx, side, None, quote, prefix, out)?;
            }
            Ok(Expansion::Consumed)
        }
        QuoteSide::Delete => {
            if quote.price.is_undef() {
                return Ok(Expansion::Consumed);
            }
            for side in [BookSide::Ask, BookSide::Bid] {
                let view = registry.view_mut(idx);
                let touched: Vec<(Price, Quantity)> = view
                    .book
                    .ladder(side)
                    .iter()
                    .take_while(|(price, _)| match side {
                        BookSide::Ask => *price <= quote.price,
                        BookSide::Bid => *price >= quote.price,
                    })
                    .map(|(price, cell)| (price, cell.qty))
                    .collect();

                for (price, old_qty) in touched {
                    let qty = if price == quote.price {
                        old_qty.saturating_add_signed(-quote.qty)
                    } else {
                        Quantity::zero(0)
                    };
                    let synthetic = BookQuote::synthetic_l2(side, price, qty, quote.ts);
                    let view = registry.view_mut(idx);
                    if let Some(applied) = view.book.apply(synthetic) {
                        config.emitter.emit(view, &applied, prefix, out)?;
                    }
                }
            }
            Ok(Expansion::Consumed)
        }
        QuoteSide::Ask | QuoteSide::Bid if quote.flavour == QuoteFlavour::L1 => {
            let side = quote.side.as_book_side().expect("storage side");
            if quote.qty.is_negative() {
                // Invalid before any unwinding happens
                return Ok(Expansion::Consumed);
            }
            if quote.price.is_undef() {
                // A one-sided clear
                zero_levels(config, registry, idx, side, None, quote, prefix, out)?;
                return Ok(Expansion::Consumed);
            }
            zero_levels(config, registry, idx, side, Some(quote.price), quote, prefix, out)?;
            Ok(Expansion::Continue)
        }
        _ => Ok(Expansion::Continue),
    }
}

/// Emits (and applies) a synthetic zero for every live level of `side`
/// strictly better than `until`, or for the whole side when `until` is
/// `None`.
#[allow(clippy::too_many_arguments)]
fn zero_levels<W: Write>(
    config: &ConvertConfig,
    registry: &mut BookRegistry,
    idx: usize,
    side: BookSide,
    until: Option<Price>,
    quote: BookQuote,
    prefix: &[u8],
    out: &mut W,
) -> io::Result<()> {
    let view = registry.view_mut(idx);
    let stale: Vec<Price> = view
        .book
        .ladder(side)
        .iter()
        .take_while(|(price, _)| match until {
            None => true,
            Some(limit) => match side {
                BookSide::Ask => *price < limit,
                BookSide::Bid => *price > limit,
            },
        })
        .map(|(price, _)| price)
        .collect();

    for price in stale {
        let synthetic = BookQuote::synthetic_l2(side, price, Quantity::zero(0), quote.ts);
        let view = registry.view_mut(idx);
        if let Some(applied) = view.book.apply(synthetic) {
            config.emitter.emit(view, &applied, prefix, out)?;
        }
    }
    Ok(())
}

/// The historical uncross policy: while the book self-crosses, the side
/// whose top is the older quote is zeroed.
fn uncross<W: Write>(
    config: &ConvertConfig,
    registry: &mut BookRegistry,
    idx: usize,
    prefix: &[u8],
    out: &mut W,
) -> io::Result<()> {
    loop {
        let view = registry.view_mut(idx);
        let (Some(bid), Some(ask)) = (view.book.top(BookSide::Bid), view.book.top(BookSide::Ask))
        else {
            return Ok(());
        };
        if ask.price > bid.price {
            return Ok(());
        }

        let (side, price) = if bid.ts <= ask.ts {
            (BookSide::Bid, bid.price)
        } else {
            (BookSide::Ask, ask.price)
        };
        log::debug!("Uncrossing: zeroing {side} top at {price}");
        let synthetic = BookQuote::synthetic_l2(side, price, Quantity::zero(0), bid.ts.max(ask.ts));
        if let Some(applied) = view.book.apply(synthetic) {
            config.emitter.emit(view, &applied, prefix, out)?;
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn convert(emitter: Emitter, input: &str) -> String {
        let config = ConvertConfig {
            emitter,
            uncross: false,
        };
        let mut registry = BookRegistry::dynamic();
        let mut out = Vec::new();
        run_convert(&config, &mut registry, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    const TWO_SIDED_BUILD: &str =
        "X\tA2\t200.0\t300\nX\tA2\t198.0\t100\nX\tB2\t197.0\t300\nX\tB2\t196.0\t100\n";

    #[rstest]
    fn test_raw2_passthrough() {
        let out = convert(Emitter::Raw2, TWO_SIDED_BUILD);
        assert_eq!(
            out,
            "X\tA2\t200.0\t300\nX\tA2\t198.0\t100\nX\tB2\t197.0\t300\nX\tB2\t196.0\t100\n"
        );
    }

    #[rstest]
    fn test_top1_compresses_build() {
        let out = convert(Emitter::Top1, TWO_SIDED_BUILD);
        assert_eq!(
            out.lines().last().unwrap(),
            "X\tc1\t197.0\t198.0\t300\t100"
        );
    }

    #[rstest]
    fn test_l1_unwinds_under_raw2() {
        let input = format!("{TWO_SIDED_BUILD}X\tA1\t199.0\t50\n");
        let out = convert(Emitter::Raw2, &input);
        assert_eq!(
            out,
            "X\tA2\t200.0\t300\nX\tA2\t198.0\t100\nX\tB2\t197.0\t300\nX\tB2\t196.0\t100\n\
             X\tA2\t198.0\t0\nX\tA2\t199.0\t50\n"
        );
    }

    #[rstest]
    fn test_clear_emits_zeros_under_raw2() {
        let input = "X\tB2\t197.0\t300\nX\tA2\t198.0\t100\nX\tC0\t0\t0\n";
        let out = convert(Emitter::Raw2, input);
        assert_eq!(
            out,
            "X\tB2\t197.0\t300\nX\tA2\t198.0\t100\nX\tB2\t197.0\t0\nX\tA2\t198.0\t0\n"
        );
    }

    #[rstest]
    fn test_trade_print_under_raw2() {
        let input = format!("{TWO_SIDED_BUILD}X\tT0\t198.0\t40\n");
        let out = convert(Emitter::Raw2, &input);
        assert_eq!(
            out.lines().last().unwrap(),
            "X\tA2\t198.0\t60",
            "the boundary level keeps its remainder"
        );
    }

    #[rstest]
    fn test_l1_negative_qty_dropped_before_unwind() {
        let input = format!("{TWO_SIDED_BUILD}X\tA1\t199.0\t-50\n");
        let out = convert(Emitter::Raw2, &input);
        assert_eq!(out, TWO_SIDED_BUILD, "no unwinding for an invalid L1");
    }

    #[rstest]
    fn test_delta3_from_l2_stream() {
        let input = "X\tB2\t10.0\t5\nX\tB2\t10.0\t3\n";
        let out = convert(Emitter::Delta3, input);
        assert_eq!(out, "X\tB3\t10.0\t5\nX\tB3\t10.0\t-2\n");
    }

    #[rstest]
    fn test_invalid_lines_dropped() {
        let input = "garbage\nX\tZ9\t1\t1\nX\tA2\t1.0\t1\n";
        let out = convert(Emitter::Raw2, input);
        assert_eq!(out, "X\tA2\t1.0\t1\n");
    }

    #[rstest]
    fn test_partial_last_line_dropped() {
        let input = "X\tA2\t1.0\t1\nX\tA2\t2.0\t2";
        let out = convert(Emitter::Raw2, input);
        assert_eq!(out, "X\tA2\t1.0\t1\n");
    }

    #[rstest]
    fn test_explicit_registry_filters_instruments() {
        let config = ConvertConfig {
            emitter: Emitter::Raw2,
            uncross: false,
        };
        let mut registry = BookRegistry::explicit(&["X".to_string()]);
        let mut out = Vec::new();
        let input = "X\tA2\t1.0\t1\nY\tA2\t2.0\t2\n";
        run_convert(&config, &mut registry, input.as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "X\tA2\t1.0\t1\n");
    }

    #[rstest]
    fn test_multiplexed_instruments_have_separate_books() {
        let input = "X\tA2\t10.0\t1\nY\tA2\t20.0\t2\nX\tA1\t11.0\t5\n";
        let out = convert(Emitter::Raw2, &input.to_string());
        // The L1 on X unwinds X's 10.0 but leaves Y untouched
        assert_eq!(
            out,
            "X\tA2\t10.0\t1\nY\tA2\t20.0\t2\nX\tA2\t10.0\t0\nX\tA2\t11.0\t5\n"
        );
    }

    #[rstest]
    fn test_uncross_zeroes_older_top() {
        let config = ConvertConfig {
            emitter: Emitter::Top1,
            uncross: true,
        };
        let mut registry = BookRegistry::dynamic();
        let mut out = Vec::new();
        // The bid arrives first; the crossing ask then wins
        let input = "1\tX\tB2\t10.0\t5\n2\tX\tA2\t9.0\t3\n";
        run_convert(&config, &mut registry, input.as_bytes(), &mut out).unwrap();

        let result = String::from_utf8(out).unwrap();
        let last = result.lines().last().unwrap();
        assert_eq!(last, "2\tX\tc1\t\t9.0\t\t3", "bid zeroed, ask stands");
    }
}
