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

//! Command-line interface for the bookcast stream tools.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]

pub mod opt;

use std::io::{self, BufWriter};

use bookcast_stream::{BookRegistry, convert::ConvertConfig, run_convert, run_snapshots, snap::SnapConfig};

use crate::opt::{ConvertCli, SnapCli};

fn make_registry(instruments: &[String]) -> BookRegistry {
    if instruments.is_empty() {
        BookRegistry::dynamic()
    } else {
        BookRegistry::explicit(instruments)
    }
}

/// Runs the converter from stdin to stdout.
///
/// # Errors
///
/// Returns an error on invalid options or an output failure.
pub fn run_converter(cli: &ConvertCli) -> anyhow::Result<()> {
    let config = ConvertConfig {
        emitter: cli.emitter()?,
        uncross: cli.uncross,
    };
    let mut registry = make_registry(&cli.instruments);
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    run_convert(&config, &mut registry, stdin, stdout)?;
    Ok(())
}

/// Runs the snapshotter from stdin to stdout.
///
/// # Errors
///
/// Returns an error on invalid options, an unreadable stamps file, or an
/// output failure.
pub fn run_snapshotter(cli: &SnapCli) -> anyhow::Result<()> {
    let mut setup = cli.setup()?;
    let config = SnapConfig {
        emitter: setup.emitter,
        invalidate: setup.invalidate,
    };
    let mut registry = make_registry(&cli.instruments);
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    run_snapshots(&config, &mut registry, &mut setup.metronome, stdin, stdout)?;
    Ok(())
}
