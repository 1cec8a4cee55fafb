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

//! A `UnixNanos` type for working with timestamps in nanoseconds since the UNIX epoch.

use std::{
    cmp::Ordering,
    fmt::Display,
    ops::{Add, AddAssign, Deref, Sub, SubAssign},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a timestamp in nanoseconds since the UNIX epoch.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnixNanos(u64);

/// The "not a time" sentinel, greater than every real timestamp.
///
/// Quote streams use this to mark unparsable stamps, and the snapshot
/// metronome returns it once a stamp list is exhausted.
pub const NATV: UnixNanos = UnixNanos::MAX;

impl UnixNanos {
    /// The zero timestamp (the UNIX epoch).
    pub const ZERO: Self = Self(0);

    /// The maximum representable timestamp.
    pub const MAX: Self = Self(u64::MAX);

    /// Returns the underlying value as `u64`.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the underlying value as `f64`.
    #[must_use]
    pub const fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Returns true if this is the [`NATV`] sentinel.
    #[must_use]
    pub const fn is_natv(&self) -> bool {
        self.0 == u64::MAX
    }

    /// Adds a duration, saturating at [`NATV`] instead of overflowing.
    #[must_use]
    pub const fn saturating_add_ns(&self, rhs: DurationNanos) -> Self {
        Self(self.0.saturating_add(rhs))
    }

    /// Converts the underlying value to a datetime (UTC).
    #[must_use]
    pub const fn to_datetime_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0 as i64)
    }
}

impl Deref for UnixNanos {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<u64> for UnixNanos {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<u64> for UnixNanos {
    fn partial_cmp(&self, other: &u64) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

impl From<u64> for UnixNanos {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UnixNanos> for u64 {
    fn from(value: UnixNanos) -> Self {
        value.0
    }
}

impl From<DateTime<Utc>> for UnixNanos {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from(value.timestamp_nanos_opt().expect("Invalid timestamp") as u64)
    }
}

impl FromStr for UnixNanos {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(UnixNanos)
    }
}

impl Add for UnixNanos {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(
            self.0
                .checked_add(rhs.0)
                .expect("Error adding with overflow"),
        )
    }
}

impl Sub for UnixNanos {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(
            self.0
                .checked_sub(rhs.0)
                .expect("Error subtracting with underflow"),
        )
    }
}

impl Add<u64> for UnixNanos {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.checked_add(rhs).expect("Error adding with overflow"))
    }
}

impl Sub<u64> for UnixNanos {
    type Output = Self;

    fn sub(self, rhs: u64) -> Self::Output {
        Self(
            self.0
                .checked_sub(rhs)
                .expect("Error subtracting with underflow"),
        )
    }
}

impl<T: Into<u64>> AddAssign<T> for UnixNanos {
    fn add_assign(&mut self, other: T) {
        let other_u64 = other.into();
        self.0 = self
            .0
            .checked_add(other_u64)
            .expect("Error adding with overflow");
    }
}

impl<T: Into<u64>> SubAssign<T> for UnixNanos {
    fn sub_assign(&mut self, other: T) {
        let other_u64 = other.into();
        self.0 = self
            .0
            .checked_sub(other_u64)
            .expect("Error subtracting with underflow");
    }
}

impl Display for UnixNanos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a duration in nanoseconds.
pub type DurationNanos = u64;

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_new_and_deref() {
        let nanos = UnixNanos::from(123);
        assert_eq!(*nanos, 123);
        assert_eq!(nanos.as_u64(), 123);
    }

    #[rstest]
    fn test_natv_ordering() {
        assert!(NATV > UnixNanos::from(u64::MAX - 1));
        assert!(NATV.is_natv());
        assert!(!UnixNanos::default().is_natv());
    }

    #[rstest]
    fn test_saturating_add_ns() {
        assert_eq!(NATV.saturating_add_ns(1), NATV);
        assert_eq!(
            UnixNanos::from(10).saturating_add_ns(5),
            UnixNanos::from(15)
        );
    }

    #[rstest]
    fn test_arithmetic() {
        let a = UnixNanos::from(100);
        let b = UnixNanos::from(40);
        assert_eq!(a + b, UnixNanos::from(140));
        assert_eq!(a - b, UnixNanos::from(60));
        assert_eq!(a + 1u64, UnixNanos::from(101));

        let mut c = a;
        c += 10u64;
        assert_eq!(c, UnixNanos::from(110));
    }

    #[rstest]
    fn test_from_str() {
        let nanos: UnixNanos = "1234567890".parse().unwrap();
        assert_eq!(nanos.as_u64(), 1_234_567_890);
        assert!("abc".parse::<UnixNanos>().is_err());
    }

    #[rstest]
    fn test_display() {
        assert_eq!(format!("{}", UnixNanos::from(42)), "42");
    }
}
