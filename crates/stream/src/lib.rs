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

//! Streaming orchestrator turning quote events into book views.
//!
//! Parses tab-separated quote lines, routes them to per-instrument books,
//! applies the updates and emits the configured derived view: raw level-2
//! diffs, level-3 deltas, aligned top-of-book or top-N quotes, and
//! (value-)consolidated books. A snapshotting driver additionally fires
//! whole-view emissions on a wall-clock metronome.
//!
//! The pipeline is strictly single-threaded and event-driven: one line in,
//! synchronous book mutation, synchronous write to the output sink.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod convert;
pub mod emit;
pub mod registry;
pub mod snap;
pub mod xquo;

// Re-exports
pub use convert::{ConvertConfig, run_convert};
pub use emit::Emitter;
pub use registry::{BookRegistry, ViewBook};
pub use snap::{Metronome, SnapConfig, SnapEmitter, run_snapshots};
pub use xquo::{ParseError, ParsedQuote, parse_quote};
