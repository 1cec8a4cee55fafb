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

//! Enumerations for the order-book domain model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

/// The side (or verb) carried by a wire quote.
///
/// `Ask` and `Bid` are storage sides; `Clear` empties the whole book and
/// `Delete` is the trade-print verb consuming levels up to its price.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteSide {
    /// The sell side of the book.
    Ask = 1,
    /// The buy side of the book.
    Bid = 2,
    /// Verb: clear both sides of the book.
    Clear = 3,
    /// Verb: a trade print consuming levels up to its price on both sides.
    Delete = 4,
}

impl QuoteSide {
    /// Maps a wire side letter (`A`/`B`/`C`/`T`, case-insensitive).
    ///
    /// `T` marks a trade print, which deletes consumed levels.
    #[must_use]
    pub const fn from_wire(byte: u8) -> Option<Self> {
        match byte | 0x20 {
            b'a' => Some(Self::Ask),
            b'b' => Some(Self::Bid),
            b'c' => Some(Self::Clear),
            b't' => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the storage side, or `None` for the verbs.
    #[must_use]
    pub const fn as_book_side(&self) -> Option<BookSide> {
        match self {
            Self::Ask => Some(BookSide::Ask),
            Self::Bid => Some(BookSide::Bid),
            Self::Clear | Self::Delete => None,
        }
    }
}

/// A specified storage side of the book.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookSide {
    /// The sell side of the book (levels ascend in price).
    Ask = 1,
    /// The buy side of the book (levels descend in price).
    Bid = 2,
}

impl BookSide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Ask => Self::Bid,
            Self::Bid => Self::Ask,
        }
    }

    /// The output record side letter (`A` or `B`).
    #[must_use]
    pub const fn wire_char(&self) -> char {
        match self {
            Self::Ask => 'A',
            Self::Bid => 'B',
        }
    }

    /// Converts back to the wire-level quote side.
    #[must_use]
    pub const fn as_quote_side(&self) -> QuoteSide {
        match self {
            Self::Ask => QuoteSide::Ask,
            Self::Bid => QuoteSide::Bid,
        }
    }
}

/// The flavour of a wire quote, i.e. which update convention it follows.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteFlavour {
    /// Invalid flavour.
    L0 = 0,
    /// "This is the new top; everything strictly better is implicitly gone."
    L1 = 1,
    /// "Set this price level to this quantity."
    L2 = 2,
    /// "Add this signed quantity to this price level, saturating at zero."
    L3 = 3,
}

impl QuoteFlavour {
    /// Maps a wire flavour digit (`'0'`..`'3'`); anything else is [`Self::L0`].
    #[must_use]
    pub fn from_wire(byte: u8) -> Self {
        Self::from_repr((byte ^ b'0') as usize).unwrap_or(Self::L0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(b'A', Some(QuoteSide::Ask))]
    #[case(b'a', Some(QuoteSide::Ask))]
    #[case(b'B', Some(QuoteSide::Bid))]
    #[case(b'b', Some(QuoteSide::Bid))]
    #[case(b'C', Some(QuoteSide::Clear))]
    #[case(b'T', Some(QuoteSide::Delete))]
    #[case(b't', Some(QuoteSide::Delete))]
    #[case(b'X', None)]
    #[case(b'1', None)]
    fn test_quote_side_from_wire(#[case] byte: u8, #[case] expected: Option<QuoteSide>) {
        assert_eq!(QuoteSide::from_wire(byte), expected);
    }

    #[rstest]
    fn test_as_book_side() {
        assert_eq!(QuoteSide::Ask.as_book_side(), Some(BookSide::Ask));
        assert_eq!(QuoteSide::Bid.as_book_side(), Some(BookSide::Bid));
        assert_eq!(QuoteSide::Clear.as_book_side(), None);
        assert_eq!(QuoteSide::Delete.as_book_side(), None);
    }

    #[rstest]
    fn test_book_side() {
        assert_eq!(BookSide::Ask.opposite(), BookSide::Bid);
        assert_eq!(BookSide::Ask.wire_char(), 'A');
        assert_eq!(BookSide::Bid.wire_char(), 'B');
    }

    #[rstest]
    #[case(b'0', QuoteFlavour::L0)]
    #[case(b'1', QuoteFlavour::L1)]
    #[case(b'2', QuoteFlavour::L2)]
    #[case(b'3', QuoteFlavour::L3)]
    #[case(b'4', QuoteFlavour::L0)]
    #[case(b'x', QuoteFlavour::L0)]
    fn test_flavour_from_wire(#[case] byte: u8, #[case] expected: QuoteFlavour) {
        assert_eq!(QuoteFlavour::from_wire(byte), expected);
    }
}
