// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::iter;

use rand::rngs::StdRng;
use termstress_common::config::FamilyKind;

use super::alphabet::{Alphabet, is_plain_printable};
use super::{Generator, GeneratorSettings, GroupUnits, TestUnit};

pub const FILLER: u8 = b'a';

/// Appended after the boundary byte by groups 5 and 6 to test how the line
/// continues after the wrap.
pub const CONTINUATION: &[u8] = b"a\nb";

/// Lines sized around exact multiples of the terminal width.
///
/// | group | content                                              |
/// |-------|------------------------------------------------------|
/// | 1     | `repeats` random lines of `width * i`, i in 1..=9    |
/// | 2     | the same with `width * i + 1`                        |
/// | 3     | `width` fillers, then each byte 0-255                |
/// | 4     | `width + 1` fillers, then each byte 0-255            |
/// | 5     | as 3, followed by [`CONTINUATION`]                   |
/// | 6     | as 4, followed by [`CONTINUATION`]                   |
#[derive(Debug, Clone)]
pub struct FullWidthFill {
    settings: GeneratorSettings,
}

impl FullWidthFill {
    #[must_use]
    pub const fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// Line lengths of group 1 (`extra == 0`) or group 2 (`extra == 1`).
    pub fn lengths(&self, extra: usize) -> impl Iterator<Item = usize> {
        let columns = self.settings.width.columns();
        let repeats = self.settings.repeats;

        (1..=self.settings.full_width_multiples)
            .flat_map(move |i| iter::repeat_n(columns * i + extra, repeats))
    }

    fn multiples<'a>(&'a self, extra: usize, rng: &'a mut StdRng) -> GroupUnits<'a> {
        let width = self.settings.width;

        GroupUnits::new(self.lengths(extra).map(move |len| {
            TestUnit::checked_line(Alphabet::Lowercase.sample(rng, len), width, false)
        }))
    }

    /// `fillers` filler bytes, `byte`, and the optional continuation.
    #[must_use]
    pub fn boundary_line(&self, fillers: usize, byte: u8, continuation: bool) -> TestUnit {
        let mut body = vec![FILLER; fillers];
        body.push(byte);
        if continuation {
            body.extend_from_slice(CONTINUATION);
        }

        TestUnit::checked_line(body, self.settings.width, !is_plain_printable(byte))
    }

    fn boundary(&self, extra: usize, continuation: bool) -> GroupUnits<'_> {
        let fillers = self.settings.width.columns() + extra;
        GroupUnits::new(
            (0..=u8::MAX).map(move |byte| self.boundary_line(fillers, byte, continuation)),
        )
    }
}

impl Generator for FullWidthFill {
    fn family(&self) -> FamilyKind {
        FamilyKind::FullWidth
    }

    fn group_count(&self) -> usize {
        6
    }

    fn group<'a>(&'a self, number: usize, rng: &'a mut StdRng) -> GroupUnits<'a> {
        match number {
            1 => self.multiples(0, rng),
            2 => self.multiples(1, rng),
            3 => self.boundary(0, false),
            4 => self.boundary(1, false),
            5 => self.boundary(0, true),
            6 => self.boundary(1, true),
            _ => GroupUnits::new(iter::empty()),
        }
    }

    fn epilogue(&self) -> &'static [u8] {
        b"\n\n"
    }
}
