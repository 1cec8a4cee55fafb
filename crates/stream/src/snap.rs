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

//! The snapshotting driver.
//!
//! Instead of reacting to every update, the snapshotter fires whole-view
//! emissions on a metronome: a fixed wall-clock cadence (with optional phase
//! offset), or an external list of stamps. Each firing walks every
//! registered book, optionally expires levels older than the invalidation
//! horizon, and writes the configured snapshot record prefixed with the
//! metronome stamp and the book's label.

use std::{
    fmt::Debug,
    io::{self, BufRead, Write},
};

use bookcast_core::{
    DurationNanos, NATV, UnixNanos,
    time::{format_stamp, parse_stamp},
};
use bookcast_model::{
    enums::BookSide,
    types::{Price, Quantity},
};
use ustr::Ustr;

use crate::{
    emit::{write_combined_row, write_depth_rows},
    registry::{BookRegistry, ViewBook},
    xquo::parse_quote,
};

/// Produces the schedule of snapshot times.
pub enum Metronome {
    /// A fixed interval grid, phase-shifted by `offset`, optionally bounded
    /// so no step outruns the invalidation horizon of the previous firing.
    Interval {
        /// The grid interval in nanoseconds.
        interval: DurationNanos,
        /// The grid phase offset, canonicalised into `[0, interval)`.
        offset: DurationNanos,
        /// The invalidation horizon bounding step size (0 = unbounded).
        invalidate: DurationNanos,
        /// The last event time that triggered a horizon clamp.
        oldm: u64,
    },
    /// Snapshot times read from an external stamp list.
    Stamps {
        /// The stamp source, one `SECONDS[.FRAC]` per line.
        reader: Box<dyn BufRead>,
    },
}

impl Debug for Metronome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interval {
                interval,
                offset,
                invalidate,
                oldm,
            } => f
                .debug_struct("Interval")
                .field("interval", interval)
                .field("offset", offset)
                .field("invalidate", invalidate)
                .field("oldm", oldm)
                .finish(),
            Self::Stamps { .. } => f.debug_struct("Stamps").finish_non_exhaustive(),
        }
    }
}

impl Metronome {
    /// Creates an interval metronome.
    #[must_use]
    pub fn interval(
        interval: DurationNanos,
        offset: DurationNanos,
        invalidate: DurationNanos,
    ) -> Self {
        debug_assert!(interval > 0);
        Self::Interval {
            interval,
            offset,
            invalidate,
            oldm: 0,
        }
    }

    /// Creates a stamp-list metronome.
    #[must_use]
    pub fn stamps(reader: Box<dyn BufRead>) -> Self {
        Self::Stamps { reader }
    }

    /// Returns the next scheduled time after event time `t`, given the
    /// current metronome position `metr` ([`NATV`] once a stamp list is
    /// exhausted or unparsable).
    pub fn next(&mut self, t: UnixNanos, metr: UnixNanos) -> UnixNanos {
        match self {
            Self::Interval {
                interval,
                offset,
                invalidate,
                oldm,
            } => {
                let mut newm = t.as_u64();
                if *invalidate > 0 && metr != UnixNanos::ZERO {
                    let horizon = metr.as_u64().saturating_add(*invalidate);
                    if horizon > *oldm && horizon < newm {
                        *oldm = newm;
                        newm = horizon;
                    }
                }
                let steps = newm.wrapping_sub(1).wrapping_sub(*offset) / *interval + 1;
                UnixNanos::from(steps * *interval + *offset)
            }
            Self::Stamps { reader } => {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(n) if n > 0 => parse_stamp(line.as_bytes()).unwrap_or(NATV),
                    _ => NATV,
                }
            }
        }
    }
}

/// The configured snapshot view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapEmitter {
    /// Top-of-book (`c1`) snapshot.
    Top1,
    /// Full-book dump, one level-2 record per live level.
    Full,
    /// Level-3 deltas against the previous snapshot of the same book.
    Delta,
    /// Aligned top-N snapshot.
    TopN {
        /// Number of levels per side.
        depth: usize,
    },
    /// Quantity-consolidated top snapshot.
    Consolidated {
        /// Consolidation quantity target.
        target: Quantity,
    },
    /// Quantity-consolidated top-N snapshot.
    ConsolidatedN {
        /// Consolidation quantity target per level.
        target: Quantity,
        /// Number of levels per side.
        depth: usize,
    },
    /// Value-consolidated top snapshot.
    Value {
        /// Consolidation cash-value target.
        target: Quantity,
    },
    /// Value-consolidated top-N snapshot.
    ValueN {
        /// Consolidation cash-value target per level.
        target: Quantity,
        /// Number of levels per side.
        depth: usize,
    },
}

impl SnapEmitter {
    /// Writes one snapshot of `view` at metronome time `metr`.
    ///
    /// # Errors
    ///
    /// Returns any error from the output sink.
    pub fn snap<W: Write>(
        &self,
        view: &mut ViewBook,
        metr: UnixNanos,
        label: Option<Ustr>,
        out: &mut W,
    ) -> io::Result<()> {
        let mut prefix = format_stamp(metr);
        if let Some(label) = label {
            prefix.push('\t');
            prefix.push_str(&label);
        }
        prefix.push('\t');
        let prefix = prefix.as_bytes();

        match self {
            Self::Top1 => {
                let bid = view.book.top(BookSide::Bid).map(|q| (q.price, q.qty));
                let ask = view.book.top(BookSide::Ask).map(|q| (q.price, q.qty));
                // Prices blank out for an empty side, quantities print as zero
                out.write_all(prefix)?;
                write!(out, "c1\t")?;
                if let Some((price, _)) = bid {
                    write!(out, "{price}")?;
                }
                out.write_all(b"\t")?;
                if let Some((price, _)) = ask {
                    write!(out, "{price}")?;
                }
                out.write_all(b"\t")?;
                write!(out, "{}", bid.map_or(Quantity::zero(0), |(_, q)| q))?;
                out.write_all(b"\t")?;
                writeln!(out, "{}", ask.map_or(Quantity::zero(0), |(_, q)| q))
            }
            Self::Full => {
                for (side, tag) in [(BookSide::Bid, "B2"), (BookSide::Ask, "A2")] {
                    for (price, cell) in view.book.ladder(side).iter() {
                        out.write_all(prefix)?;
                        writeln!(out, "{tag}\t{price}\t{}", cell.qty)?;
                    }
                }
                Ok(())
            }
            Self::Delta => {
                for side in [BookSide::Bid, BookSide::Ask] {
                    let current: Vec<(Price, Quantity)> = view
                        .book
                        .ladder(side)
                        .iter()
                        .map(|(price, cell)| (price, cell.qty))
                        .collect();
                    let previous = match side {
                        BookSide::Bid => &view.cache.bids,
                        BookSide::Ask => &view.cache.asks,
                    };
                    let tag = match side {
                        BookSide::Bid => "B3",
                        BookSide::Ask => "A3",
                    };

                    for (price, delta) in delta_rows(side, &current, previous) {
                        out.write_all(prefix)?;
                        writeln!(out, "{tag}\t{price}\t{delta}")?;
                    }

                    match side {
                        BookSide::Bid => view.cache.bids = current,
                        BookSide::Ask => view.cache.asks = current,
                    }
                }
                Ok(())
            }
            Self::TopN { depth } => {
                let bids = view.book.tops(BookSide::Bid, *depth);
                let asks = view.book.tops(BookSide::Ask, *depth);
                write_depth_rows(out, prefix, &bids, &asks)
            }
            Self::Consolidated { target } => {
                let bid = view.book.ctop(BookSide::Bid, *target).map(|q| (q.price, q.qty));
                let ask = view.book.ctop(BookSide::Ask, *target).map(|q| (q.price, q.qty));
                write_combined_row(out, prefix, "c1", bid, ask)
            }
            Self::Value { target } => {
                let bid = view.book.vtop(BookSide::Bid, *target).map(|q| (q.price, q.qty));
                let ask = view.book.vtop(BookSide::Ask, *target).map(|q| (q.price, q.qty));
                write_combined_row(out, prefix, "c1", bid, ask)
            }
            Self::ConsolidatedN { target, depth } => {
                let bids = view.book.ctops(BookSide::Bid, *target, *depth);
                let asks = view.book.ctops(BookSide::Ask, *target, *depth);
                write_depth_rows(out, prefix, &bids, &asks)
            }
            Self::ValueN { target, depth } => {
                let bids = view.book.vtops(BookSide::Bid, *target, *depth);
                let asks = view.book.vtops(BookSide::Ask, *target, *depth);
                write_depth_rows(out, prefix, &bids, &asks)
            }
        }
    }
}

/// Merges the current levels of one side against the previous snapshot,
/// yielding the signed quantity changes: additions in full, vanished levels
/// as negatives, common levels as their difference (zero changes skipped).
fn delta_rows(
    side: BookSide,
    current: &[(Price, Quantity)],
    previous: &[(Price, Quantity)],
) -> Vec<(Price, Quantity)> {
    let better = |a: Price, b: Price| match side {
        BookSide::Bid => a > b,
        BookSide::Ask => a < b,
    };

    let mut rows = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < current.len() || j < previous.len() {
        if j >= previous.len() {
            rows.push(current[i]);
            i += 1;
        } else if i >= current.len() {
            rows.push((previous[j].0, -previous[j].1));
            j += 1;
        } else if current[i].0 == previous[j].0 {
            let delta = current[i].1 - previous[j].1;
            if !delta.is_zero() {
                rows.push((current[i].0, delta));
            }
            i += 1;
            j += 1;
        } else if better(current[i].0, previous[j].0) {
            rows.push(current[i]);
            i += 1;
        } else {
            rows.push((previous[j].0, -previous[j].1));
            j += 1;
        }
    }
    rows
}

/// Snapshotter configuration threaded through the stream loop.
#[derive(Clone, Copy, Debug)]
pub struct SnapConfig {
    /// The configured snapshot view.
    pub emitter: SnapEmitter,
    /// The invalidation horizon: quote timestamps are shifted by it on
    /// ingest and levels older than the firing metronome are expired
    /// before each snapshot (0 = disabled).
    pub invalidate: DurationNanos,
}

/// Runs the snapshotter over `input`, writing snapshot records to `out`.
///
/// Lines without a well-formed leading timestamp are dropped. The metronome
/// initialises from the first stamped event; a final snapshot fires at EOF
/// when the metronome ever ran.
///
/// # Errors
///
/// Returns any error from the output sink.
pub fn run_snapshots<R: BufRead, W: Write>(
    config: &SnapConfig,
    registry: &mut BookRegistry,
    metronome: &mut Metronome,
    mut input: R,
    mut out: W,
) -> io::Result<()> {
    let mut metr: Option<UnixNanos> = None;
    let mut line = Vec::new();

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if !line.ends_with(b"\n") {
            break;
        }

        let Ok(parsed) = parse_quote(&line) else {
            continue;
        };
        let Some(t) = parsed.stamp else {
            continue;
        };
        if t == UnixNanos::ZERO {
            continue;
        }

        let mut m = match metr {
            Some(m) => m,
            None => {
                let mut m = metronome.next(t, UnixNanos::ZERO);
                while m < t {
                    m = metronome.next(t, m);
                }
                metr = Some(m);
                m
            }
        };

        let Some(idx) = registry.lookup(parsed.instrument) else {
            continue;
        };

        if t > m {
            loop {
                snapshot_all(config, registry, m, &mut out)?;
                m = metronome.next(t, m);
                if m >= t {
                    break;
                }
            }
            metr = Some(m);
        }

        let mut quote = parsed.quote;
        quote.ts = quote.ts.saturating_add_ns(config.invalidate);
        registry.view_mut(idx).book.apply(quote);
    }

    if let Some(m) = metr
        && m != NATV
    {
        snapshot_all(config, registry, m, &mut out)?;
    }
    out.flush()
}

fn snapshot_all<W: Write>(
    config: &SnapConfig,
    registry: &mut BookRegistry,
    metr: UnixNanos,
    out: &mut W,
) -> io::Result<()> {
    for entry in registry.entries_mut() {
        if config.invalidate > 0 {
            entry.view.book.expire(metr);
        }
        config.emitter.snap(&mut entry.view, metr, entry.label, out)?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bookcast_core::time::NANOSECONDS_IN_SECOND;
    use rstest::rstest;

    use super::*;

    const SEC: u64 = NANOSECONDS_IN_SECOND;

    #[rstest]
    #[case(500_000_000, SEC)] // mid-interval rounds up
    #[case(SEC, SEC)] // on-grid stays
    #[case(SEC + 1, 2 * SEC)]
    #[case(1_900_000_000, 2 * SEC)]
    fn test_interval_next(#[case] t: u64, #[case] expected: u64) {
        let mut metronome = Metronome::interval(SEC, 0, 0);
        assert_eq!(
            metronome.next(UnixNanos::from(t), UnixNanos::ZERO),
            UnixNanos::from(expected)
        );
    }

    #[rstest]
    fn test_interval_next_with_offset() {
        let mut metronome = Metronome::interval(SEC, 250_000_000, 0);
        assert_eq!(
            metronome.next(UnixNanos::from(SEC), UnixNanos::ZERO),
            UnixNanos::from(1_250_000_000)
        );
        assert_eq!(
            metronome.next(UnixNanos::from(1_250_000_000), UnixNanos::ZERO),
            UnixNanos::from(1_250_000_000)
        );
    }

    #[rstest]
    fn test_interval_next_invalidate_bound() {
        // A 10s event gap with a 2s horizon: the step is clamped to
        // metr + invalidate before grid alignment
        let mut metronome = Metronome::interval(SEC, 0, 2 * SEC);
        let next = metronome.next(UnixNanos::from(10 * SEC), UnixNanos::from(3 * SEC));
        assert_eq!(next, UnixNanos::from(5 * SEC));
    }

    #[rstest]
    fn test_stamps_next() {
        let stamps = "2.000\n4.500\ngarbage\n7.000\n";
        let mut metronome = Metronome::stamps(Box::new(Cursor::new(stamps.to_string())));
        let t = UnixNanos::from(SEC);
        assert_eq!(metronome.next(t, UnixNanos::ZERO), UnixNanos::from(2 * SEC));
        assert_eq!(
            metronome.next(t, UnixNanos::ZERO),
            UnixNanos::from(4_500_000_000)
        );
        // A bad stamp ends the schedule
        assert_eq!(metronome.next(t, UnixNanos::ZERO), NATV);
    }

    #[rstest]
    fn test_snapshot_cadence() {
        // Events at 0.5s, 1.2s, 1.9s, 2.1s with a 1s interval: snapshots
        // fire at 1s, 2s, and once more after EOF
        let input = "\
0.500\tX\tA2\t200.0\t300\n\
1.200\tX\tA2\t198.0\t100\n\
1.900\tX\tB2\t197.0\t300\n\
2.100\tX\tB2\t196.0\t100\n";
        let config = SnapConfig {
            emitter: SnapEmitter::Top1,
            invalidate: 0,
        };
        let mut registry = BookRegistry::dynamic();
        let mut metronome = Metronome::interval(SEC, 0, 0);
        let mut out = Vec::new();
        run_snapshots(
            &config,
            &mut registry,
            &mut metronome,
            input.as_bytes(),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\
1.000000000\tX\tc1\t\t200.0\t0\t300\n\
2.000000000\tX\tc1\t197.0\t198.0\t300\t100\n\
3.000000000\tX\tc1\t197.0\t198.0\t300\t100\n"
        );
    }

    #[rstest]
    fn test_unstamped_lines_dropped() {
        let input = "X\tA2\t200.0\t300\n1.000\tX\tA2\t198.0\t100\n2.500\tX\tA2\t198.0\t50\n";
        let config = SnapConfig {
            emitter: SnapEmitter::Full,
            invalidate: 0,
        };
        let mut registry = BookRegistry::dynamic();
        let mut metronome = Metronome::interval(SEC, 0, 0);
        let mut out = Vec::new();
        run_snapshots(
            &config,
            &mut registry,
            &mut metronome,
            input.as_bytes(),
            &mut out,
        )
        .unwrap();

        // Only the stamped 198@100 was ingested before the 1s firing
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1.000000000\tX\tA2\t198.0\t100\n3.000000000\tX\tA2\t198.0\t50\n"
        );
    }

    #[rstest]
    fn test_invalidate_expires_stale_levels() {
        // The ask from 1.1s is older than the 1s horizon at the 3s firing
        let input = "\
1.100\tX\tA2\t200.0\t300\n\
2.600\tX\tB2\t197.0\t100\n\
3.200\tX\tB2\t196.0\t50\n";
        let config = SnapConfig {
            emitter: SnapEmitter::Top1,
            invalidate: SEC,
        };
        let mut registry = BookRegistry::dynamic();
        let mut metronome = Metronome::interval(SEC, 0, SEC);
        let mut out = Vec::new();
        run_snapshots(
            &config,
            &mut registry,
            &mut metronome,
            input.as_bytes(),
            &mut out,
        )
        .unwrap();

        let result = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = result.lines().collect();
        // At 2s the ask (stamped 1.1 + 1 = 2.1) is still alive
        assert_eq!(lines[0], "2.000000000\tX\tc1\t\t200.0\t0\t300");
        // At 3s it has aged out; the bid from 2.6s (shifted to 3.6) remains
        assert_eq!(lines[1], "3.000000000\tX\tc1\t197.0\t\t100\t0");
    }

    #[rstest]
    fn test_delta_snapshots() {
        let input = "\
1.100\tX\tB2\t10.0\t5\n\
1.200\tX\tB2\t9.0\t3\n\
2.100\tX\tB2\t10.0\t2\n\
2.200\tX\tB2\t9.0\t0\n\
2.300\tX\tA2\t11.0\t4\n";
        let config = SnapConfig {
            emitter: SnapEmitter::Delta,
            invalidate: 0,
        };
        let mut registry = BookRegistry::dynamic();
        let mut metronome = Metronome::interval(SEC, 0, 0);
        let mut out = Vec::new();
        run_snapshots(
            &config,
            &mut registry,
            &mut metronome,
            input.as_bytes(),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\
2.000000000\tX\tB3\t10.0\t5\n\
2.000000000\tX\tB3\t9.0\t3\n\
3.000000000\tX\tB3\t10.0\t-3\n\
3.000000000\tX\tB3\t9.0\t-3\n\
3.000000000\tX\tA3\t11.0\t4\n"
        );
    }

    #[rstest]
    fn test_stamps_mode_drives_snapshots() {
        let input = "1.000\tX\tA2\t10.0\t5\n3.000\tX\tA2\t10.0\t7\n";
        let config = SnapConfig {
            emitter: SnapEmitter::Top1,
            invalidate: 0,
        };
        let mut registry = BookRegistry::dynamic();
        let mut metronome = Metronome::stamps(Box::new(Cursor::new("2.500\n".to_string())));
        let mut out = Vec::new();
        run_snapshots(
            &config,
            &mut registry,
            &mut metronome,
            input.as_bytes(),
            &mut out,
        )
        .unwrap();

        // One firing at the listed stamp; the exhausted list (NATV) stops
        // the metronome and suppresses the EOF snapshot
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2.500000000\tX\tc1\t\t10.0\t0\t5\n"
        );
    }
}
