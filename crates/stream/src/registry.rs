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

//! The per-instrument book registry.
//!
//! Instruments are routed by a hash of their raw token bytes; entries are
//! scanned linearly, which beats a map for the handful of instruments a
//! stream typically multiplexes. Hash collisions deliberately share a book.
//!
//! The registry is built either from an explicit instrument list (where an
//! empty token or `*` registers a catch-all book taking every unmatched
//! instrument) or dynamically, growing from a capacity of eight as unseen
//! instruments arrive.

use std::hash::BuildHasher;

use ahash::RandomState;
use bookcast_model::{
    orderbook::Book,
    types::{Price, Quantity},
};
use ustr::Ustr;

/// The sentinel hash of the catch-all entry.
pub const HX_CATCHALL: u64 = u64::MAX;

/// Cached previous views for change-gated emitters and delta snapshots.
///
/// This state lives on the book handle rather than in any global: each
/// instrument gates its own emissions.
#[derive(Clone, Debug, Default)]
pub struct ViewCache {
    /// Previous top-of-book per side (price, size).
    pub bid_top: Option<(Price, Quantity)>,
    /// Previous top-of-book per side (price, size).
    pub ask_top: Option<(Price, Quantity)>,
    /// Previous consolidated price per side.
    pub bid_px: Option<Price>,
    /// Previous consolidated price per side.
    pub ask_px: Option<Price>,
    /// Previous top-N (or snapshot) levels, bid side.
    pub bids: Vec<(Price, Quantity)>,
    /// Previous top-N (or snapshot) levels, ask side.
    pub asks: Vec<(Price, Quantity)>,
}

/// A book together with its cached view state.
#[derive(Clone, Debug, Default)]
pub struct ViewBook {
    /// The order book.
    pub book: Book,
    /// Cached previous views for change gating.
    pub cache: ViewCache,
}

/// One registry slot.
#[derive(Clone, Debug)]
pub struct RegistryEntry {
    /// The hash of the instrument token ([`HX_CATCHALL`] for the catch-all).
    pub hx: u64,
    /// The instrument label for snapshot output (`None` when unlabelled).
    pub label: Option<Ustr>,
    /// The book and its view cache.
    pub view: ViewBook,
}

/// Routes instrument tokens to per-instrument [`ViewBook`]s.
pub struct BookRegistry {
    entries: Vec<RegistryEntry>,
    has_catchall: bool,
    dynamic: bool,
    hasher: RandomState,
}

impl std::fmt::Debug for BookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(BookRegistry))
            .field("entries", &self.entries)
            .field("has_catchall", &self.has_catchall)
            .field("dynamic", &self.dynamic)
            .finish_non_exhaustive()
    }
}

impl BookRegistry {
    /// Creates a dynamic registry allocating books as instruments appear.
    #[must_use]
    pub fn dynamic() -> Self {
        Self {
            entries: Vec::with_capacity(8),
            has_catchall: false,
            dynamic: true,
            hasher: RandomState::new(),
        }
    }

    /// Creates a registry from an explicit instrument list.
    ///
    /// An empty token or `*` registers a single catch-all book which takes
    /// every instrument the named entries miss. The catch-all is labelled
    /// `ALL` when named books exist alongside it.
    #[must_use]
    pub fn explicit(instruments: &[String]) -> Self {
        let hasher = RandomState::new();
        let mut entries: Vec<RegistryEntry> = Vec::with_capacity(instruments.len());
        let mut catchall = false;

        for name in instruments {
            if name.is_empty() || name == "*" {
                catchall = true;
                continue;
            }
            entries.push(RegistryEntry {
                hx: hasher.hash_one(name.as_bytes()),
                label: Some(Ustr::from(name)),
                view: ViewBook::default(),
            });
        }
        if catchall {
            let label = (!entries.is_empty()).then(|| Ustr::from("ALL"));
            entries.push(RegistryEntry {
                hx: HX_CATCHALL,
                label,
                view: ViewBook::default(),
            });
        }

        Self {
            entries,
            has_catchall: catchall,
            dynamic: false,
            hasher,
        }
    }

    /// Returns the number of registered books.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no books are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the book index for an instrument token.
    ///
    /// Misses fall through to the catch-all (explicit mode) or allocate a
    /// new book (dynamic mode); with neither available the quote is not for
    /// us and `None` is returned.
    pub fn lookup(&mut self, instrument: &[u8]) -> Option<usize> {
        let hx = self.hasher.hash_one(instrument);

        let named = self.entries.len() - usize::from(self.has_catchall);
        for (idx, entry) in self.entries[..named].iter().enumerate() {
            if entry.hx == hx {
                return Some(idx);
            }
        }
        if self.has_catchall {
            return Some(self.entries.len() - 1);
        }
        if !self.dynamic {
            return None;
        }

        let label = std::str::from_utf8(instrument).ok().map(Ustr::from);
        self.entries.push(RegistryEntry {
            hx,
            label,
            view: ViewBook::default(),
        });
        Some(self.entries.len() - 1)
    }

    /// Returns the view book at `idx`.
    pub fn view_mut(&mut self, idx: usize) -> &mut ViewBook {
        &mut self.entries[idx].view
    }

    /// Iterates all entries mutably (snapshot emission order).
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut RegistryEntry> {
        self.entries.iter_mut()
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
    fn test_dynamic_allocates_on_miss() {
        let mut registry = BookRegistry::dynamic();
        let a = registry.lookup(b"EURUSD").unwrap();
        let b = registry.lookup(b"USDJPY").unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.lookup(b"EURUSD").unwrap(), a);
        assert_eq!(registry.len(), 2);
    }

    #[rstest]
    fn test_dynamic_grows_past_initial_capacity() {
        let mut registry = BookRegistry::dynamic();
        for i in 0..20 {
            registry.lookup(format!("INS{i}").as_bytes()).unwrap();
        }
        assert_eq!(registry.len(), 20);
    }

    #[rstest]
    fn test_explicit_drops_unknown() {
        let mut registry = BookRegistry::explicit(&["EURUSD".to_string()]);
        assert!(registry.lookup(b"EURUSD").is_some());
        assert!(registry.lookup(b"USDJPY").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[rstest]
    #[case("*")]
    #[case("")]
    fn test_catchall_token(#[case] token: &str) {
        let mut registry = BookRegistry::explicit(&[token.to_string()]);
        assert_eq!(registry.len(), 1);
        let idx = registry.lookup(b"ANYTHING").unwrap();
        assert_eq!(registry.lookup(b"ELSE").unwrap(), idx);
        // A lone catch-all stays unlabelled
        assert_eq!(registry.entries_mut().next().unwrap().label, None);
    }

    #[rstest]
    fn test_catchall_with_named_books() {
        let mut registry =
            BookRegistry::explicit(&["EURUSD".to_string(), "*".to_string(), "USDJPY".to_string()]);
        assert_eq!(registry.len(), 3);

        let named = registry.lookup(b"EURUSD").unwrap();
        let other = registry.lookup(b"GBPUSD").unwrap();
        assert_ne!(named, other);

        let labels: Vec<Option<Ustr>> = registry.entries_mut().map(|e| e.label).collect();
        assert_eq!(labels[2], Some(Ustr::from("ALL")));
    }
}
