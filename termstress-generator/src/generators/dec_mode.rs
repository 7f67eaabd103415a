// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::iter;

use rand::Rng;
use rand::rngs::StdRng;
use termstress_common::config::FamilyKind;

use super::csi::PREFIX;
use super::{Generator, GeneratorSettings, GroupUnits, TestUnit};

/// Bracketed paste, the only mode fuzzed outside the two contiguous ranges.
pub const BRACKETED_PASTE: u16 = 2004;

/// DEC private mode numbers that are fuzzed: 0-99, 1000-1061 and 2004.
#[must_use]
pub fn private_modes() -> Vec<u16> {
    (0..100)
        .chain(1000..1062)
        .chain(iter::once(BRACKETED_PASTE))
        .collect()
}

/// Random DEC private mode set / reset sequences, `test ESC [ ? Pm h|l`.
#[derive(Debug, Clone)]
pub struct DecModeFuzz {
    settings: GeneratorSettings,
    modes: Vec<u16>,
}

impl DecModeFuzz {
    #[must_use]
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            modes: private_modes(),
        }
    }

    #[must_use]
    pub fn modes(&self) -> &[u16] {
        &self.modes
    }

    pub fn sequence<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u8> {
        let mode = self.modes[rng.random_range(0..self.modes.len())];
        let suffix = if rng.random_bool(0.5) { 'h' } else { 'l' };

        let mut line = PREFIX.to_vec();
        line.extend_from_slice(format!("\x1b[?{mode}{suffix}").as_bytes());
        line
    }
}

impl Generator for DecModeFuzz {
    fn family(&self) -> FamilyKind {
        FamilyKind::DecModes
    }

    fn group_count(&self) -> usize {
        1
    }

    fn group<'a>(&'a self, number: usize, rng: &'a mut StdRng) -> GroupUnits<'a> {
        if number != 1 {
            return GroupUnits::new(iter::empty());
        }

        GroupUnits::new(
            (0..self.settings.fuzz_count).map(move |_| TestUnit::line(self.sequence(rng))),
        )
    }
}
