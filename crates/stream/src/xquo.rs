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

//! Wire quote deserialisation.
//!
//! Lines are tab-separated and read right-to-left: the last field is the
//! quantity, then the price, then a `<side><flavour>` field, preceded by the
//! instrument token. Everything up to and including the instrument's
//! trailing tab is the verbatim prefix reproduced on output, so timestamps
//! and any extra leading columns flow through untouched.
//!
//! ```text
//! [prefix \t] instrument \t sideflav \t price \t qty \n
//! ```

use std::str::{self, FromStr};

use bookcast_core::{UnixNanos, time::parse_stamp};
use bookcast_model::{
    data::BookQuote,
    enums::{QuoteFlavour, QuoteSide},
    types::{Price, Quantity},
};
use thiserror::Error;

/// The reason a line was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No quantity field (the line has no tab at all).
    #[error("missing quantity field")]
    MissingQty,
    /// The quantity field is not a plain decimal number.
    #[error("invalid quantity field")]
    InvalidQty,
    /// No price field (the line has a single tab).
    #[error("missing price field")]
    MissingPrice,
    /// The side/flavour field is empty or carries an unknown side letter.
    #[error("unknown side letter")]
    UnknownSide,
}

/// A parsed wire quote borrowing from its source line.
#[derive(Clone, Copy, Debug)]
pub struct ParsedQuote<'a> {
    /// The leading timestamp, when present and well-formed.
    pub stamp: Option<UnixNanos>,
    /// The decoded quote; `ts` is the stamp or zero.
    pub quote: BookQuote,
    /// The instrument token (may be empty).
    pub instrument: &'a [u8],
    /// Byte length of the verbatim output prefix (instrument and its
    /// trailing tab included).
    pub prefix_len: usize,
}

/// Parses one quote line.
///
/// The price field tolerates garbage: anything that is not a plain decimal
/// (including the literal `nan`) becomes the undefined price, which the book
/// treats as a side-clearing level-1. An unparsable quantity rejects the
/// line, as do unknown side letters.
///
/// # Errors
///
/// Returns a [`ParseError`] describing why the line cannot be a quote.
pub fn parse_quote(line: &[u8]) -> Result<ParsedQuote<'_>, ParseError> {
    let line = match line.last() {
        Some(b'\n') => &line[..line.len() - 1],
        _ => line,
    };

    let qty_tab = rmemchr_tab(line).ok_or(ParseError::MissingQty)?;
    let qty = field_str(&line[qty_tab + 1..])
        .and_then(|s| Quantity::from_str(s).ok())
        .ok_or(ParseError::InvalidQty)?;

    let rest = &line[..qty_tab];
    let price_tab = rmemchr_tab(rest).ok_or(ParseError::MissingPrice)?;
    let price = field_str(&rest[price_tab + 1..])
        .and_then(|s| Price::from_str(s).ok())
        .unwrap_or_else(Price::undef);

    let rest = &rest[..price_tab];
    let sf_start = rmemchr_tab(rest).map_or(0, |i| i + 1);
    let sideflav = &rest[sf_start..];
    let (&side_byte, &flav_byte) = match (sideflav.first(), sideflav.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(ParseError::UnknownSide),
    };
    let side = QuoteSide::from_wire(side_byte).ok_or(ParseError::UnknownSide)?;
    let flavour = QuoteFlavour::from_wire(flav_byte);

    let (instrument, prefix_len) = if sf_start > 0 {
        let ins_end = sf_start - 1; // the tab before the side/flavour field
        let ins_start = rmemchr_tab(&line[..ins_end]).map_or(0, |i| i + 1);
        let instrument = &line[ins_start..ins_end];
        let prefix_len = if instrument.is_empty() {
            ins_start
        } else {
            ins_end + 1
        };
        (instrument, prefix_len)
    } else {
        (&line[..0], 0)
    };

    let stamp = parse_stamp(line);
    Ok(ParsedQuote {
        stamp,
        quote: BookQuote::new(side, flavour, price, qty, stamp.unwrap_or(UnixNanos::ZERO)),
        instrument,
        prefix_len,
    })
}

fn rmemchr_tab(haystack: &[u8]) -> Option<usize> {
    haystack.iter().rposition(|b| *b == b'\t')
}

fn field_str(field: &[u8]) -> Option<&str> {
    let s = str::from_utf8(field).ok()?;
    (!s.trim().is_empty()).then_some(s)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_parse_basic_line() {
        let parsed = parse_quote(b"X\tA2\t200.0\t300\n").unwrap();
        assert_eq!(parsed.quote.side, QuoteSide::Ask);
        assert_eq!(parsed.quote.flavour, QuoteFlavour::L2);
        assert_eq!(parsed.quote.price, Price::from("200.0"));
        assert_eq!(parsed.quote.qty, Quantity::from("300"));
        assert_eq!(parsed.instrument, b"X");
        assert_eq!(parsed.prefix_len, 2); // "X\t"
        assert_eq!(parsed.stamp, None);
    }

    #[rstest]
    #[case(b"X\tb1\t1.5\t2".as_slice(), QuoteSide::Bid, QuoteFlavour::L1)]
    #[case(b"X\ta3\t1.5\t-2".as_slice(), QuoteSide::Ask, QuoteFlavour::L3)]
    #[case(b"X\tC0\t0\t0".as_slice(), QuoteSide::Clear, QuoteFlavour::L0)]
    #[case(b"X\tT0\t1.5\t2".as_slice(), QuoteSide::Delete, QuoteFlavour::L0)]
    #[case(b"X\tC\t0\t0".as_slice(), QuoteSide::Clear, QuoteFlavour::L0)]
    fn test_parse_side_flavour(
        #[case] line: &[u8],
        #[case] side: QuoteSide,
        #[case] flavour: QuoteFlavour,
    ) {
        let parsed = parse_quote(line).unwrap();
        assert_eq!(parsed.quote.side, side);
        assert_eq!(parsed.quote.flavour, flavour);
    }

    #[rstest]
    fn test_parse_stamped_line() {
        let line = b"1668069748.046000000\tEURUSD\tB2\t1.03210\t500000\n";
        let parsed = parse_quote(line).unwrap();
        assert_eq!(parsed.stamp, Some(UnixNanos::from(1_668_069_748_046_000_000)));
        assert_eq!(parsed.quote.ts, UnixNanos::from(1_668_069_748_046_000_000));
        assert_eq!(parsed.instrument, b"EURUSD");
        // Prefix spans the stamp, the instrument and its trailing tab
        assert_eq!(&line[..parsed.prefix_len], b"1668069748.046000000\tEURUSD\t");
    }

    #[rstest]
    fn test_parse_no_instrument() {
        let parsed = parse_quote(b"A2\t200.0\t300\n").unwrap();
        assert_eq!(parsed.instrument, b"");
        assert_eq!(parsed.prefix_len, 0);
    }

    #[rstest]
    fn test_parse_nan_price() {
        let parsed = parse_quote(b"X\tA1\tnan\t0\n").unwrap();
        assert!(parsed.quote.price.is_undef());

        // Garbage prices degrade to undefined as well
        let parsed = parse_quote(b"X\tA1\t???\t0\n").unwrap();
        assert!(parsed.quote.price.is_undef());
    }

    #[rstest]
    #[case(b"no tabs at all".as_slice(), ParseError::MissingQty)]
    #[case(b"X\t300".as_slice(), ParseError::MissingPrice)]
    #[case(b"X\tA2\t1.0\tx00".as_slice(), ParseError::InvalidQty)]
    #[case(b"X\tZ2\t1.0\t300".as_slice(), ParseError::UnknownSide)]
    #[case(b"X\t\t1.0\t300".as_slice(), ParseError::UnknownSide)]
    fn test_parse_rejects(#[case] line: &[u8], #[case] err: ParseError) {
        assert_eq!(parse_quote(line).unwrap_err(), err);
    }

    #[rstest]
    fn test_prefix_carries_extra_columns() {
        let line = b"col1\tcol2\tFOO\tB3\t9.5\t-25\n";
        let parsed = parse_quote(line).unwrap();
        assert_eq!(parsed.instrument, b"FOO");
        assert_eq!(&line[..parsed.prefix_len], b"col1\tcol2\tFOO\t");
        assert_eq!(parsed.quote.qty, Quantity::from("-25"));
    }
}
