// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::iter;

use rand::rngs::StdRng;
use termstress_common::config::FamilyKind;

use super::alphabet::Alphabet;
use super::{Generator, GeneratorSettings, GroupUnits, TestUnit};

/// Alphabets of groups 2 through 5, in order.
pub const FILL_ALPHABETS: [Alphabet; 4] = [
    Alphabet::Lowercase,
    Alphabet::Whitespace,
    Alphabet::Printable,
    Alphabet::Extended,
];

/// Plain text lines of every length up to the configured bound.
///
/// Group 1 counts `1` to `9`, one paced line each. Groups 2-5 emit `repeats`
/// random lines of each length in `1..max_line_length`, drawn from
/// [`FILL_ALPHABETS`].
#[derive(Debug, Clone)]
pub struct SimpleFill {
    settings: GeneratorSettings,
}

impl SimpleFill {
    #[must_use]
    pub const fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// Line lengths of a fill group, each repeated `repeats` times.
    pub fn lengths(&self) -> impl Iterator<Item = usize> {
        let repeats = self.settings.repeats;
        (1..self.settings.max_line_length).flat_map(move |len| iter::repeat_n(len, repeats))
    }

    fn fill<'a>(&'a self, alphabet: Alphabet, rng: &'a mut StdRng) -> GroupUnits<'a> {
        let width = self.settings.width;

        GroupUnits::new(self.lengths().map(move |len| {
            TestUnit::checked_line(alphabet.sample(rng, len), width, alphabet.is_ambiguous())
        }))
    }
}

impl Generator for SimpleFill {
    fn family(&self) -> FamilyKind {
        FamilyKind::Simple
    }

    fn group_count(&self) -> usize {
        1 + FILL_ALPHABETS.len()
    }

    fn group<'a>(&'a self, number: usize, rng: &'a mut StdRng) -> GroupUnits<'a> {
        match number {
            1 => GroupUnits::new((1..=9).map(|i: u8| TestUnit::line(i.to_string().into_bytes())))
                .paced(),
            n => match n.checked_sub(2).and_then(|i| FILL_ALPHABETS.get(i)) {
                Some(&alphabet) => self.fill(alphabet, rng),
                None => GroupUnits::new(iter::empty()),
            },
        }
    }

    fn epilogue(&self) -> &'static [u8] {
        b"\x1b[0m\n\n"
    }
}
