// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::iter;

use rand::Rng;
use rand::rngs::StdRng;
use termstress_common::config::FamilyKind;

use super::alphabet::Alphabet;
use super::{Generator, GeneratorSettings, GroupUnits, TestUnit};

/// Text written before each fuzzed command so every line prints something.
pub const PREFIX: &[u8] = b"test";

/// Parameters the command fuzzer picks from: empty, negative, zero and the
/// small values most final bytes give a meaning to.
pub const BOUNDARY_PARAMS: [&str; 8] = ["-1", "", "0", "1", "2", "4", "5", "6"];

/// Highest SGR parameter fuzzed.
pub const SGR_MAX: u8 = 110;

/// Random control sequences.
///
/// Group 1: `test ESC [ Pn F`, group 2: `test ESC [ Pn ; Pn F`, where each
/// `Pn` is one of [`BOUNDARY_PARAMS`] and `F` is an ASCII letter. Group 3:
/// `ESC [ Pn m test` with `Pn` in `0..=110`.
#[derive(Debug, Clone)]
pub struct CsiFuzz {
    settings: GeneratorSettings,
}

impl CsiFuzz {
    #[must_use]
    pub const fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// One fuzzed command with `params` parameters.
    pub fn command<R: Rng + ?Sized>(rng: &mut R, params: usize) -> Vec<u8> {
        let mut command = PREFIX.to_vec();
        command.extend_from_slice(b"\x1b[");

        for i in 0..params {
            if i > 0 {
                command.push(b';');
            }
            let param = BOUNDARY_PARAMS[rng.random_range(0..BOUNDARY_PARAMS.len())];
            command.extend_from_slice(param.as_bytes());
        }

        command.push(Alphabet::Letters.pick(rng));
        command
    }

    /// One graphic rendition change followed by text.
    pub fn sgr<R: Rng + ?Sized>(rng: &mut R) -> Vec<u8> {
        let param = rng.random_range(0..=SGR_MAX);
        format!("\x1b[{param}mtest").into_bytes()
    }

    fn repeat<'a>(&self, rng: &'a mut StdRng, make: fn(&mut StdRng) -> Vec<u8>) -> GroupUnits<'a> {
        GroupUnits::new((0..self.settings.fuzz_count).map(move |_| TestUnit::line(make(rng))))
    }
}

impl Generator for CsiFuzz {
    fn family(&self) -> FamilyKind {
        FamilyKind::CsiCommands
    }

    fn group_count(&self) -> usize {
        3
    }

    fn group<'a>(&'a self, number: usize, rng: &'a mut StdRng) -> GroupUnits<'a> {
        match number {
            1 => self.repeat(rng, |rng| Self::command(rng, 1)),
            2 => self.repeat(rng, |rng| Self::command(rng, 2)),
            3 => self.repeat(rng, Self::sgr),
            _ => GroupUnits::new(iter::empty()),
        }
    }

    fn epilogue(&self) -> &'static [u8] {
        // group 3 leaves arbitrary renditions behind
        b"\x1b[0m"
    }
}
