// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rand::rngs::StdRng;
use termstress_common::config::{FamilyKind, RunConfig};
use termstress_common::terminal_size::TerminalWidth;

pub mod alphabet;
pub mod csi;
pub mod dec_mode;
pub mod full_width;
pub mod simple;

pub use csi::CsiFuzz;
pub use dec_mode::DecModeFuzz;
pub use full_width::FullWidthFill;
pub use simple::SimpleFill;

/// How far a unit is expected to move the cursor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Expectation {
    /// Screen rows the unit occupies, counting one column per byte. The cursor
    /// ends at the start of the row after them.
    pub rows: usize,
    /// Set when the unit holds control, whitespace or 8-bit bytes, so the
    /// one-column-per-byte count may not hold.
    pub ambiguous: bool,
}

/// One line of output sent to the terminal under test.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TestUnit {
    /// The full emission, trailing newline included.
    pub bytes: Vec<u8>,
    pub expectation: Option<Expectation>,
}

impl TestUnit {
    /// A line whose effect on the cursor is not predicted.
    #[must_use]
    pub fn line(mut body: Vec<u8>) -> Self {
        body.push(b'\n');
        Self {
            bytes: body,
            expectation: None,
        }
    }

    /// A line with a predicted row displacement for `width`.
    #[must_use]
    pub fn checked_line(mut body: Vec<u8>, width: TerminalWidth, ambiguous: bool) -> Self {
        let rows = body
            .split(|&b| b == b'\n')
            .map(|segment| width.rows_for(segment.len()))
            .sum();

        body.push(b'\n');
        Self {
            bytes: body,
            expectation: Some(Expectation { rows, ambiguous }),
        }
    }

    /// The line without its trailing newline.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.bytes.strip_suffix(b"\n").unwrap_or(&self.bytes)
    }

    /// Printable rendering for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        self.body().escape_ascii().to_string()
    }
}

/// Lazily produced units of one numbered test group.
pub struct GroupUnits<'a> {
    pub units: Box<dyn Iterator<Item = TestUnit> + 'a>,
    /// Sleep the counting interval after every unit.
    pub paced: bool,
}

impl<'a> GroupUnits<'a> {
    pub fn new(units: impl Iterator<Item = TestUnit> + 'a) -> Self {
        Self {
            units: Box::new(units),
            paced: false,
        }
    }

    #[must_use]
    pub fn paced(mut self) -> Self {
        self.paced = true;
        self
    }
}

/// Knobs shared by every family for one run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GeneratorSettings {
    pub width: TerminalWidth,
    pub max_line_length: usize,
    pub repeats: usize,
    pub full_width_multiples: usize,
    pub fuzz_count: usize,
}

impl GeneratorSettings {
    #[must_use]
    pub const fn new(width: TerminalWidth, run: &RunConfig) -> Self {
        Self {
            width,
            max_line_length: run.max_line_length,
            repeats: run.repeats,
            full_width_multiples: run.full_width_multiples,
            fuzz_count: run.fuzz_count,
        }
    }
}

/// A family of test groups. Groups are numbered from 1 and run in order; the
/// only state carried between them is the random generator passed in.
pub trait Generator {
    fn family(&self) -> FamilyKind;

    fn group_count(&self) -> usize;

    /// Units of group `number`.
    ///
    /// Numbers outside `1..=group_count()` yield no units.
    fn group<'a>(&'a self, number: usize, rng: &'a mut StdRng) -> GroupUnits<'a>;

    /// Bytes written once after the last group.
    fn epilogue(&self) -> &'static [u8] {
        b""
    }
}

#[must_use]
pub fn generator_for(kind: FamilyKind, settings: GeneratorSettings) -> Box<dyn Generator> {
    match kind {
        FamilyKind::Simple => Box::new(SimpleFill::new(settings)),
        FamilyKind::FullWidth => Box::new(FullWidthFill::new(settings)),
        FamilyKind::CsiCommands => Box::new(CsiFuzz::new(settings)),
        FamilyKind::DecModes => Box::new(DecModeFuzz::new(settings)),
    }
}

/// Every unit a family produces, group after group, as one flat stream.
pub fn family_units<'a>(
    generator: &'a dyn Generator,
    rng: &'a mut StdRng,
) -> impl Iterator<Item = TestUnit> + 'a {
    // each group borrows the rng, so it is drained before the next one starts
    (1..=generator.group_count())
        .flat_map(move |n| generator.group(n, rng).units.collect::<Vec<_>>())
}
