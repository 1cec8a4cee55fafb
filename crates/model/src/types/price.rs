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

//! Represents a price in a market, with a fixed-point decimal representation.

use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
    ops::{Add, Sub},
    str::FromStr,
};

use bookcast_core::correctness::{FAILED, check_in_range_inclusive_f64};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::fixed::{
    FIXED_PRECISION, FixedRaw, check_fixed_precision, f64_to_fixed_raw, fixed_raw_to_f64,
    format_fixed, parse_fixed, pow10_raw,
};

/// The raw i64 (or i128 in high-precision mode) backing a [`Price`].
pub type PriceRaw = FixedRaw;

/// The sentinel raw value for an undefined price (the wire `nan`).
pub const PRICE_UNDEF: PriceRaw = PriceRaw::MAX;

#[cfg(feature = "high-precision")]
/// The maximum valid price value which can be represented.
pub const PRICE_MAX: f64 = 10_000_000_000_000_000_000.0;

#[cfg(not(feature = "high-precision"))]
/// The maximum valid price value which can be represented.
pub const PRICE_MAX: f64 = 9_223_372_036.0;

/// The minimum valid price value which can be represented.
pub const PRICE_MIN: f64 = -PRICE_MAX;

/// Represents a price in a market, with a fixed-point decimal representation.
///
/// The `raw` value is always scaled to [`FIXED_PRECISION`] decimal places, so
/// equality and ordering ignore the trailing-zero cohort: `200.0` and
/// `200.00` are one key. The `precision` field records the cohort for
/// rendering only.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Price {
    /// The raw fixed-point value, scaled to [`FIXED_PRECISION`].
    pub raw: PriceRaw,
    /// The number of fraction digits rendered (the trailing-zero cohort).
    pub precision: u8,
}

impl Price {
    /// Creates a new [`Price`] instance, rounding `value` to `precision`
    /// decimal places.
    ///
    /// This is also the quantisation primitive: re-constructing a computed
    /// value at a donor tick's precision rounds it to that decimal exponent.
    ///
    /// # Panics
    ///
    /// Panics on invalid `value` or `precision` (see [`Self::new_checked`]).
    #[must_use]
    pub fn new(value: f64, precision: u8) -> Self {
        Self::new_checked(value, precision).expect(FAILED)
    }

    /// Creates a new [`Price`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not in [`PRICE_MIN`], [`PRICE_MAX`]
    /// (NaN and infinities included), or `precision` exceeds the maximum.
    pub fn new_checked(value: f64, precision: u8) -> anyhow::Result<Self> {
        check_fixed_precision(precision)?;
        check_in_range_inclusive_f64(value, PRICE_MIN, PRICE_MAX, "value")?;
        Ok(Self {
            raw: f64_to_fixed_raw(value, precision),
            precision,
        })
    }

    /// Creates a new [`Price`] from a raw fixed-point value.
    #[must_use]
    pub fn from_raw(raw: PriceRaw, precision: u8) -> Self {
        debug_assert!(check_fixed_precision(precision).is_ok());
        Self { raw, precision }
    }

    /// Creates the undefined-price sentinel (the wire `nan`).
    #[must_use]
    pub const fn undef() -> Self {
        Self {
            raw: PRICE_UNDEF,
            precision: 0,
        }
    }

    /// Returns true if this is the undefined-price sentinel.
    #[must_use]
    pub const fn is_undef(&self) -> bool {
        self.raw == PRICE_UNDEF
    }

    /// Returns true if the price is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        !self.is_undef() && self.raw > 0
    }

    /// Returns the price as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        debug_assert!(!self.is_undef());
        fixed_raw_to_f64(self.raw)
    }

    /// Returns the price as a `Decimal` at its rendered precision.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        debug_assert!(!self.is_undef());
        let scaled = self.raw / pow10_raw(FIXED_PRECISION - self.precision);
        Decimal::from_i128_with_scale(scaled as i128, u32::from(self.precision))
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for Price {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Add for Price {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        debug_assert!(!self.is_undef() && !rhs.is_undef());
        Self {
            raw: self.raw.checked_add(rhs.raw).expect("price overflow"),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Sub for Price {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        debug_assert!(!self.is_undef() && !rhs.is_undef());
        Self {
            raw: self.raw.checked_sub(rhs.raw).expect("price underflow"),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl FromStr for Price {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("nan") {
            return Ok(Self::undef());
        }
        let (raw, precision) = parse_fixed(s)?;
        Ok(Self { raw, precision })
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Self::from_str(value).expect(FAILED)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_undef() {
            return write!(f, "nan");
        }
        write!(f, "{}", format_fixed(self.raw, self.precision))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
