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

//! Command-line options for the bookcast tools.

use std::path::PathBuf;

use anyhow::Context;
use bookcast_core::{
    DurationNanos,
    time::{NANOSECONDS_IN_SECOND, parse_duration},
};
use bookcast_model::types::Quantity;
use bookcast_stream::{Emitter, Metronome, SnapEmitter};
use clap::Parser;

/// Converts a limit-order-book event stream into a derived view stream.
///
/// Reads tab-separated quote lines on stdin and writes the selected view to
/// stdout; any line prefix (timestamps, extra columns) is reproduced
/// verbatim.
#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct ConvertCli {
    /// Emit the aligned top-of-book view
    #[arg(short = '1')]
    pub top: bool,
    /// Emit raw level-2 records (the default)
    #[arg(short = '2')]
    pub raw: bool,
    /// Emit level-3 quantity deltas
    #[arg(short = '3')]
    pub delta: bool,
    /// Emit aligned top-N books with this many levels
    #[arg(short = 'N', value_name = "LEVELS")]
    pub ntop: Option<usize>,
    /// Consolidate out to this quantity; a leading '/' consolidates by
    /// cash value instead
    #[arg(short = 'C', value_name = "[/]QTY")]
    pub consolidate: Option<String>,
    /// Track only these instruments ('*' or an empty token adds a
    /// catch-all book); omit to track every instrument seen
    #[arg(long = "instr", value_name = "NAME")]
    pub instruments: Vec<String>,
    /// Resolve self-crossed books by zeroing the older top
    #[arg(long)]
    pub uncross: bool,
}

impl ConvertCli {
    /// Resolves the configured converter emitter.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero level count or a non-positive
    /// consolidation target.
    pub fn emitter(&self) -> anyhow::Result<Emitter> {
        let mut emitter = Emitter::Raw2;
        if self.top {
            emitter = Emitter::Top1;
        }
        if self.delta {
            emitter = Emitter::Delta3;
        }
        if self.raw {
            emitter = Emitter::Raw2;
        }

        let mut depth = 1usize;
        if let Some(n) = self.ntop {
            anyhow::ensure!(n > 0, "cannot read number of levels for top-N book");
            depth = n;
            emitter = if n > 1 {
                Emitter::TopN { depth: n }
            } else {
                Emitter::Top1
            };
        }

        if let Some(spec) = &self.consolidate {
            let (target, by_value) = parse_consolidation(spec)?;
            emitter = match (by_value, depth > 1) {
                (false, false) => Emitter::Consolidated { target },
                (false, true) => Emitter::ConsolidatedN { target, depth },
                (true, false) => Emitter::Value { target },
                (true, true) => Emitter::ValueN { target, depth },
            };
        }
        Ok(emitter)
    }
}

/// Emits periodic book snapshots on a wall-clock metronome.
///
/// Reads timestamped tab-separated quote lines on stdin and writes the
/// selected snapshot view to stdout at each metronome firing (and once more
/// at end of stream).
#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct SnapCli {
    /// Snapshot the top of book
    #[arg(short = '1')]
    pub top: bool,
    /// Snapshot the full book as level-2 records (the default)
    #[arg(short = '2')]
    pub full: bool,
    /// Snapshot level-3 deltas against the previous snapshot
    #[arg(short = '3')]
    pub delta: bool,
    /// Snapshot aligned top-N books with this many levels
    #[arg(short = 'N', value_name = "LEVELS")]
    pub ntop: Option<usize>,
    /// Consolidate out to this quantity; a leading '/' consolidates by
    /// cash value instead
    #[arg(short = 'C', value_name = "[/]QTY")]
    pub consolidate: Option<String>,
    /// Track only these instruments ('*' or an empty token adds a
    /// catch-all book); omit to track every instrument seen
    #[arg(long = "instr", value_name = "NAME")]
    pub instruments: Vec<String>,
    /// Snapshot interval; bare numbers are seconds (default 1s)
    #[arg(long, value_name = "N[UNIT]")]
    pub interval: Option<String>,
    /// Metronome phase offset; inert in stamps mode
    #[arg(long, value_name = "+-N[UNIT]", allow_hyphen_values = true)]
    pub offset: Option<String>,
    /// Expire levels older than this before each snapshot; bare numbers
    /// are multiples of the interval
    #[arg(long, value_name = "N[UNIT]")]
    pub invalidate: Option<String>,
    /// Read snapshot times from this file instead of a fixed interval
    #[arg(long, value_name = "FILE")]
    pub stamps: Option<PathBuf>,
}

/// A resolved snapshotter setup.
#[derive(Debug)]
pub struct SnapSetup {
    /// The snapshot view.
    pub emitter: SnapEmitter,
    /// The firing schedule.
    pub metronome: Metronome,
    /// The invalidation horizon (0 = disabled).
    pub invalidate: DurationNanos,
}

impl SnapCli {
    /// Resolves the snapshot emitter, metronome and invalidation horizon.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed durations, a non-positive interval or
    /// consolidation target, a zero level count, or an unreadable stamps
    /// file.
    pub fn setup(&self) -> anyhow::Result<SnapSetup> {
        let mut interval: DurationNanos = NANOSECONDS_IN_SECOND;
        if let Some(spec) = &self.interval {
            let (value, unit) = parse_duration(spec).context("cannot read interval argument")?;
            anyhow::ensure!(value > 0, "interval must be positive");
            interval = (value as DurationNanos) * unit.unwrap_or(NANOSECONDS_IN_SECOND);
        }
        if self.stamps.is_some() {
            // Stamp lists pace themselves; the unit interval only scales
            // bare --invalidate values
            interval = 1;
        }

        let mut offset: DurationNanos = 0;
        if let Some(spec) = &self.offset {
            let (value, unit) = parse_duration(spec).context("cannot read offset argument")?;
            let offset_ns = value * unit.unwrap_or(NANOSECONDS_IN_SECOND) as i64;
            if self.stamps.is_none() {
                offset = offset_ns.rem_euclid(interval as i64) as DurationNanos;
            }
        }

        let mut invalidate: DurationNanos = 0;
        if let Some(spec) = &self.invalidate {
            let (value, unit) = parse_duration(spec).context("cannot read invalidate argument")?;
            anyhow::ensure!(value >= 0, "invalidate must not be negative");
            invalidate = (value as DurationNanos) * unit.unwrap_or(interval);
        }

        let metronome = match &self.stamps {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("cannot open stamps file {}", path.display()))?;
                Metronome::stamps(Box::new(std::io::BufReader::new(file)))
            }
            None => Metronome::interval(interval, offset, invalidate),
        };

        let mut emitter = SnapEmitter::Full;
        if self.top {
            emitter = SnapEmitter::Top1;
        }
        if self.delta {
            emitter = SnapEmitter::Delta;
        }
        if self.full {
            emitter = SnapEmitter::Full;
        }

        let mut depth = 1usize;
        if let Some(n) = self.ntop {
            anyhow::ensure!(n > 0, "cannot read number of levels for top-N book");
            depth = n;
            emitter = if n > 1 {
                SnapEmitter::TopN { depth: n }
            } else {
                SnapEmitter::Top1
            };
        }

        if let Some(spec) = &self.consolidate {
            let (target, by_value) = parse_consolidation(spec)?;
            emitter = match (by_value, depth > 1) {
                (false, false) => SnapEmitter::Consolidated { target },
                (false, true) => SnapEmitter::ConsolidatedN { target, depth },
                (true, false) => SnapEmitter::Value { target },
                (true, true) => SnapEmitter::ValueN { target, depth },
            };
        }

        Ok(SnapSetup {
            emitter,
            metronome,
            invalidate,
        })
    }
}

fn parse_consolidation(spec: &str) -> anyhow::Result<(Quantity, bool)> {
    let by_value = spec.starts_with('/');
    let target: Quantity = spec[usize::from(by_value)..]
        .parse()
        .map_err(|_| anyhow::anyhow!("cannot read consolidated quantity"))?;
    anyhow::ensure!(target.is_positive(), "cannot read consolidated quantity");
    Ok((target, by_value))
}
