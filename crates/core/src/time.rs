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

//! Wire-format time parsing and formatting.
//!
//! Quote streams carry timestamps as `SECONDS[.FRAC]` where the fractional
//! part has exactly 0, 3, 6 or 9 digits (millisecond, microsecond or
//! nanosecond resolution). Durations on the command line carry a unit suffix
//! (`ns`, `us`, `ms`, `s`, `m` or `h`).

use crate::nanos::{DurationNanos, UnixNanos};

/// The number of nanoseconds in one second.
pub const NANOSECONDS_IN_SECOND: u64 = 1_000_000_000;

/// The number of nanoseconds in one millisecond.
pub const NANOSECONDS_IN_MILLISECOND: u64 = 1_000_000;

/// The number of nanoseconds in one microsecond.
pub const NANOSECONDS_IN_MICROSECOND: u64 = 1_000;

/// Parses a `SECONDS[.FRAC]` stamp into nanoseconds since the epoch.
///
/// Leading spaces and tabs are skipped. The fractional part must have
/// exactly 0, 3, 6 or 9 digits; anything else (or a missing seconds field)
/// invalidates the stamp.
#[must_use]
pub fn parse_stamp(bytes: &[u8]) -> Option<UnixNanos> {
    let mut i = 0;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }

    let mut secs: u64 = 0;
    let sec_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        secs = secs
            .checked_mul(10)?
            .checked_add(u64::from(bytes[i] - b'0'))?;
        i += 1;
    }
    if i == sec_start {
        return None;
    }

    let mut frac: u64 = 0;
    let mut frac_digits = 0usize;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            frac = frac * 10 + u64::from(bytes[i] - b'0');
            frac_digits += 1;
            i += 1;
        }
    }

    let frac_ns = match frac_digits {
        0 => 0,
        3 => frac * NANOSECONDS_IN_MILLISECOND,
        6 => frac * NANOSECONDS_IN_MICROSECOND,
        9 => frac,
        _ => return None,
    };

    Some(UnixNanos::from(
        secs.checked_mul(NANOSECONDS_IN_SECOND)?
            .checked_add(frac_ns)?,
    ))
}

/// Formats a timestamp as `SECONDS.NNNNNNNNN` (full nanosecond resolution).
#[must_use]
pub fn format_stamp(t: UnixNanos) -> String {
    let ns = t.as_u64();
    format!(
        "{}.{:09}",
        ns / NANOSECONDS_IN_SECOND,
        ns % NANOSECONDS_IN_SECOND
    )
}

/// Parses a signed duration with an optional unit suffix.
///
/// Returns the numeric value together with the unit multiplier in
/// nanoseconds, or `None` for the multiplier when no suffix was given
/// (callers supply their own default unit).
///
/// # Errors
///
/// Returns an error if the value is missing or the suffix is not one of
/// `ns`, `us`, `ms`, `s`, `m`, `h` (case-insensitive).
pub fn parse_duration(s: &str) -> anyhow::Result<(i64, Option<DurationNanos>)> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '+'))
        .unwrap_or(s.len());
    let (value, suffix) = s.split_at(split);
    let value: i64 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid duration value: {s:?}"))?;

    let unit = match suffix.to_ascii_lowercase().as_str() {
        "" => None,
        "ns" => Some(1),
        "us" => Some(NANOSECONDS_IN_MICROSECOND),
        "ms" => Some(NANOSECONDS_IN_MILLISECOND),
        "s" => Some(NANOSECONDS_IN_SECOND),
        "m" => Some(60 * NANOSECONDS_IN_SECOND),
        "h" => Some(3_600 * NANOSECONDS_IN_SECOND),
        _ => anyhow::bail!("invalid duration suffix {suffix:?}, use ns, us, ms, s, m, or h"),
    };

    Ok((value, unit))
}
