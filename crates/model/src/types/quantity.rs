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

//! Represents a quantity with a fixed-point decimal representation.

use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use bookcast_core::correctness::{FAILED, check_in_range_inclusive_f64};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::fixed::{
    FIXED_PRECISION, FixedRaw, check_fixed_precision, f64_to_fixed_raw, fixed_raw_to_f64,
    format_fixed, parse_fixed, pow10_raw,
};

/// The raw i64 (or i128 in high-precision mode) backing a [`Quantity`].
pub type QuantityRaw = FixedRaw;

#[cfg(feature = "high-precision")]
/// The maximum valid quantity value which can be represented.
pub const QUANTITY_MAX: f64 = 10_000_000_000_000_000_000.0;

#[cfg(not(feature = "high-precision"))]
/// The maximum valid quantity value which can be represented.
pub const QUANTITY_MAX: f64 = 9_223_372_036.0;

/// The minimum valid quantity value which can be represented.
///
/// Quantities are signed: level-3 wire updates carry deltas which may be
/// negative. Stored book cells stay non-negative by saturation in the book,
/// not by this type.
pub const QUANTITY_MIN: f64 = -QUANTITY_MAX;

/// Represents a quantity with a fixed-point decimal representation.
///
/// As with [`Price`](crate::types::Price), the `raw` value is scaled to
/// [`FIXED_PRECISION`] and carries equality/ordering; `precision` records
/// the trailing-zero cohort for rendering.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Quantity {
    /// The raw fixed-point value, scaled to [`FIXED_PRECISION`].
    pub raw: QuantityRaw,
    /// The number of fraction digits rendered (the trailing-zero cohort).
    pub precision: u8,
}

impl Quantity {
    /// Creates a new [`Quantity`] instance, rounding `value` to `precision`
    /// decimal places.
    ///
    /// # Panics
    ///
    /// Panics on invalid `value` or `precision` (see [`Self::new_checked`]).
    #[must_use]
    pub fn new(value: f64, precision: u8) -> Self {
        Self::new_checked(value, precision).expect(FAILED)
    }

    /// Creates a new [`Quantity`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not in [`QUANTITY_MIN`],
    /// [`QUANTITY_MAX`] (NaN and infinities included), or `precision`
    /// exceeds the maximum.
    pub fn new_checked(value: f64, precision: u8) -> anyhow::Result<Self> {
        check_fixed_precision(precision)?;
        check_in_range_inclusive_f64(value, QUANTITY_MIN, QUANTITY_MAX, "value")?;
        Ok(Self {
            raw: f64_to_fixed_raw(value, precision),
            precision,
        })
    }

    /// Creates a new [`Quantity`] from a raw fixed-point value.
    #[must_use]
    pub fn from_raw(raw: QuantityRaw, precision: u8) -> Self {
        debug_assert!(check_fixed_precision(precision).is_ok());
        Self { raw, precision }
    }

    /// Creates a zero quantity at the given precision.
    #[must_use]
    pub const fn zero(precision: u8) -> Self {
        Self { raw: 0, precision }
    }

    /// Returns true if the quantity is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Returns true if the quantity is strictly positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.raw > 0
    }

    /// Returns true if the quantity is strictly negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.raw < 0
    }

    /// Returns the quantity as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        fixed_raw_to_f64(self.raw)
    }

    /// Returns the quantity as a `Decimal` at its rendered precision.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        let scaled = self.raw / pow10_raw(FIXED_PRECISION - self.precision);
        Decimal::from_i128_with_scale(scaled as i128, u32::from(self.precision))
    }

    /// Adds a signed delta, saturating the result at zero.
    ///
    /// The result carries the wider of the two precisions.
    #[must_use]
    pub fn saturating_add_signed(&self, delta: Self) -> Self {
        Self {
            raw: self
                .raw
                .checked_add(delta.raw)
                .expect("quantity overflow")
                .max(0),
            precision: self.precision.max(delta.precision),
        }
    }

    /// Returns the quantity clamped to be non-negative.
    #[must_use]
    pub fn clamped_nonneg(&self) -> Self {
        Self {
            raw: self.raw.max(0),
            precision: self.precision,
        }
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Add for Quantity {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            raw: self.raw.checked_add(rhs.raw).expect("quantity overflow"),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Sub for Quantity {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            raw: self.raw.checked_sub(rhs.raw).expect("quantity underflow"),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Neg for Quantity {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self {
            raw: -self.raw,
            precision: self.precision,
        }
    }
}

impl FromStr for Quantity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (raw, precision) = parse_fixed(s)?;
        Ok(Self { raw, precision })
    }
}

impl From<&str> for Quantity {
    fn from(value: &str) -> Self {
        Self::from_str(value).expect(FAILED)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self::new(value as f64, 0)
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_fixed(self.raw, self.precision))
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
