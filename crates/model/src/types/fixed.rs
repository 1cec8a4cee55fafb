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

//! Functions for handling fixed-point arithmetic.
//!
//! This module provides constants and functions that enforce a fixed-point
//! precision strategy, ensuring consistent precision and scaling across the
//! [`Price`](crate::types::Price) and [`Quantity`](crate::types::Quantity)
//! value types.
//!
//! Raw values are stored scaled to [`FIXED_PRECISION`] decimal places, so two
//! values that are numerically equal share one raw representation regardless
//! of how many trailing zeros their source text carried. The `precision`
//! field of the value types records that trailing-zero cohort for rendering.

// -----------------------------------------------------------------------------
// FIXED_PRECISION
// -----------------------------------------------------------------------------

#[cfg(feature = "high-precision")]
/// The maximum fixed-point precision.
pub const FIXED_PRECISION: u8 = 16;

#[cfg(not(feature = "high-precision"))]
/// The maximum fixed-point precision.
pub const FIXED_PRECISION: u8 = 9;

// -----------------------------------------------------------------------------
// FIXED_SCALAR
// -----------------------------------------------------------------------------

#[cfg(feature = "high-precision")]
/// The scalar value corresponding to the maximum precision (10^16).
pub const FIXED_SCALAR: f64 = 10_000_000_000_000_000.0;

#[cfg(not(feature = "high-precision"))]
/// The scalar value corresponding to the maximum precision (10^9).
pub const FIXED_SCALAR: f64 = 1_000_000_000.0;

// -----------------------------------------------------------------------------
// Raw representation width
// -----------------------------------------------------------------------------

#[cfg(feature = "high-precision")]
/// The raw fixed-point backing integer (128-bit).
pub type FixedRaw = i128;

#[cfg(not(feature = "high-precision"))]
/// The raw fixed-point backing integer (64-bit).
pub type FixedRaw = i64;

/// Returns 10^`exp` in the raw integer width.
#[must_use]
pub const fn pow10_raw(exp: u8) -> FixedRaw {
    let mut result: FixedRaw = 1;
    let mut i = 0;
    while i < exp {
        result *= 10;
        i += 1;
    }
    result
}

/// Checks if a given `precision` value is within the allowed fixed-point precision range.
///
/// # Errors
///
/// Returns an error if `precision` exceeds [`FIXED_PRECISION`].
pub fn check_fixed_precision(precision: u8) -> anyhow::Result<()> {
    if precision > FIXED_PRECISION {
        anyhow::bail!(
            "`precision` exceeded maximum `FIXED_PRECISION` ({FIXED_PRECISION}), was {precision}"
        )
    }
    Ok(())
}

/// Converts an `f64` to a raw fixed-point value, rounded at the given precision.
///
/// The result is a multiple of the scale factor for `precision`, which makes
/// this the quantisation primitive: the value is rounded to the decimal
/// exponent `10^-precision` before scaling up to [`FIXED_PRECISION`].
#[must_use]
pub fn f64_to_fixed_raw(value: f64, precision: u8) -> FixedRaw {
    debug_assert!(precision <= FIXED_PRECISION);
    let pow1 = pow10_raw(precision);
    let pow2 = pow10_raw(FIXED_PRECISION - precision);
    let rounded = (value * pow1 as f64).round() as FixedRaw;
    rounded * pow2
}

/// Converts a raw fixed-point value back to `f64`.
#[must_use]
pub fn fixed_raw_to_f64(raw: FixedRaw) -> f64 {
    (raw as f64) / FIXED_SCALAR
}

/// Parses a decimal string into a raw fixed-point value and its precision.
///
/// The precision is inferred from the number of fraction digits, preserving
/// the trailing-zero cohort of the source text (`"200.0"` renders back as
/// `200.0`, not `200`). Scientific notation is not supported.
///
/// # Errors
///
/// Returns an error if the string is not a plain signed decimal or the
/// fraction exceeds [`FIXED_PRECISION`] digits.
pub fn parse_fixed(s: &str) -> anyhow::Result<(FixedRaw, u8)> {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        anyhow::bail!("invalid decimal string: {s:?}")
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        anyhow::bail!("invalid decimal string: {s:?}")
    }

    let precision = u8::try_from(frac_part.len())
        .ok()
        .filter(|p| *p <= FIXED_PRECISION)
        .ok_or_else(|| {
            anyhow::anyhow!("fraction exceeds maximum precision ({FIXED_PRECISION}): {s:?}")
        })?;

    let mut raw: FixedRaw = 0;
    for b in int_part.bytes() {
        raw = raw
            .checked_mul(10)
            .and_then(|r| r.checked_add(FixedRaw::from(b - b'0')))
            .ok_or_else(|| anyhow::anyhow!("decimal string out of range: {s:?}"))?;
    }
    raw = raw
        .checked_mul(pow10_raw(FIXED_PRECISION))
        .ok_or_else(|| anyhow::anyhow!("decimal string out of range: {s:?}"))?;

    let mut frac: FixedRaw = 0;
    for b in frac_part.bytes() {
        frac = frac * 10 + FixedRaw::from(b - b'0');
    }
    raw += frac * pow10_raw(FIXED_PRECISION - precision);

    Ok((if negative { -raw } else { raw }, precision))
}

/// Renders a raw fixed-point value with exactly `precision` fraction digits.
#[must_use]
pub fn format_fixed(raw: FixedRaw, precision: u8) -> String {
    debug_assert!(precision <= FIXED_PRECISION);
    let scale = pow10_raw(FIXED_PRECISION);
    let sign = if raw < 0 { "-" } else { "" };
    let abs = raw.abs();
    let int = abs / scale;
    if precision == 0 {
        format!("{sign}{int}")
    } else {
        let frac = (abs % scale) / pow10_raw(FIXED_PRECISION - precision);
        format!("{sign}{int}.{frac:0width$}", width = precision as usize)
    }
}
