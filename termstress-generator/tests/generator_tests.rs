// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;

use proptest::{prop_assert, prop_assert_eq, proptest};
use rand::SeedableRng;
use rand::rngs::StdRng;
use termstress_common::config::{FamilyKind, RunConfig};
use termstress_common::terminal_size::TerminalWidth;
use termstress_generator::generators::alphabet::Alphabet;
use termstress_generator::generators::csi::{BOUNDARY_PARAMS, PREFIX, SGR_MAX};
use termstress_generator::generators::dec_mode::{BRACKETED_PASTE, private_modes};
use termstress_generator::generators::{
    CsiFuzz, DecModeFuzz, FullWidthFill, Generator, GeneratorSettings, SimpleFill, TestUnit,
    family_units, generator_for,
};

fn settings(columns: usize) -> GeneratorSettings {
    GeneratorSettings::new(TerminalWidth::new(columns).unwrap(), &RunConfig::default())
}

fn small_settings(columns: usize) -> GeneratorSettings {
    let run = RunConfig {
        max_line_length: 6,
        repeats: 2,
        full_width_multiples: 3,
        fuzz_count: 20,
        ..RunConfig::default()
    };
    GeneratorSettings::new(TerminalWidth::new(columns).unwrap(), &run)
}

fn group(generator: &dyn Generator, number: usize, seed: u64) -> Vec<TestUnit> {
    let mut rng = StdRng::seed_from_u64(seed);
    generator.group(number, &mut rng).units.collect()
}

/// Split `test ESC [ p1 ; p2 X` into its parameters and final letter.
fn split_command(body: &[u8]) -> (Vec<String>, u8) {
    let rest = body.strip_prefix(PREFIX).unwrap();
    let rest = rest.strip_prefix(b"\x1b[").unwrap();
    let (&letter, params) = rest.split_last().unwrap();
    let params = std::str::from_utf8(params)
        .unwrap()
        .split(';')
        .map(str::to_string)
        .collect();
    (params, letter)
}

// ------------------------
// Family layout
// ------------------------

#[test]
fn families_have_expected_group_counts() {
    let expected = [
        (FamilyKind::Simple, 5),
        (FamilyKind::FullWidth, 6),
        (FamilyKind::CsiCommands, 3),
        (FamilyKind::DecModes, 1),
    ];

    for (kind, groups) in expected {
        let generator = generator_for(kind, settings(80));
        assert_eq!(generator.family(), kind);
        assert_eq!(generator.group_count(), groups, "{kind}");
    }
}

#[test]
fn groups_out_of_range_are_empty() {
    for kind in FamilyKind::ALL {
        let generator = generator_for(kind, small_settings(10));
        assert!(group(generator.as_ref(), 0, 1).is_empty());
        assert!(group(generator.as_ref(), generator.group_count() + 1, 1).is_empty());
    }
}

#[test]
fn every_unit_ends_in_a_newline() {
    for kind in FamilyKind::ALL {
        let generator = generator_for(kind, small_settings(10));
        let mut rng = StdRng::seed_from_u64(3);
        for unit in family_units(generator.as_ref(), &mut rng) {
            assert_eq!(unit.bytes.last(), Some(&b'\n'), "{kind}: {}", unit.describe());
        }
    }
}

#[test]
fn epilogues_reset_what_the_family_leaves_behind() {
    assert_eq!(SimpleFill::new(settings(80)).epilogue(), b"\x1b[0m\n\n");
    assert_eq!(FullWidthFill::new(settings(80)).epilogue(), b"\n\n");
    assert_eq!(CsiFuzz::new(settings(80)).epilogue(), b"\x1b[0m");
    assert_eq!(DecModeFuzz::new(settings(80)).epilogue(), b"");
}

// ------------------------
// Simple fill
// ------------------------

#[test]
fn counting_group_is_paced_and_unchecked() {
    let generator = SimpleFill::new(settings(80));
    let mut rng = StdRng::seed_from_u64(0);
    let counting = generator.group(1, &mut rng);
    assert!(counting.paced);

    let units: Vec<TestUnit> = counting.units.collect();
    assert_eq!(units.len(), 9);
    for (i, unit) in units.iter().enumerate() {
        assert_eq!(unit.bytes, format!("{}\n", i + 1).into_bytes());
        assert!(unit.expectation.is_none());
    }
}

#[test]
fn fill_lengths_cover_the_exclusive_range() {
    let generator = SimpleFill::new(settings(80));
    let lengths: Vec<usize> = generator.lengths().collect();

    assert_eq!(lengths.len(), 499 * 10);
    assert_eq!(lengths.first(), Some(&1));
    assert_eq!(lengths.last(), Some(&499));
    assert!(lengths[..10].iter().all(|&len| len == 1));
}

#[test]
fn fill_groups_use_their_alphabet() {
    let generator = SimpleFill::new(small_settings(10));
    let cases = [
        (2, Alphabet::Lowercase),
        (3, Alphabet::Whitespace),
        (4, Alphabet::Printable),
        (5, Alphabet::Extended),
    ];

    for (number, alphabet) in cases {
        let units = group(&generator, number, 11);
        assert_eq!(units.len(), 5 * 2);
        for unit in &units {
            let body = &unit.bytes[..unit.bytes.len() - 1];
            assert!(
                body.iter().all(|b| alphabet.symbols().contains(b)),
                "group {number}: {}",
                unit.describe()
            );
            let expectation = unit.expectation.unwrap();
            assert_eq!(expectation.ambiguous, alphabet.is_ambiguous());
        }
    }
}

#[test]
fn lowercase_fill_predicts_wrapped_rows() {
    let generator = SimpleFill::new(small_settings(4));
    for unit in group(&generator, 2, 5) {
        let len = unit.body().len();
        assert_eq!(unit.expectation.unwrap().rows, len.div_ceil(4));
    }
}

#[test]
fn same_seed_same_fill() {
    let generator = SimpleFill::new(small_settings(10));
    for number in 2..=5 {
        assert_eq!(group(&generator, number, 42), group(&generator, number, 42));
    }
    assert_ne!(group(&generator, 2, 42), group(&generator, 2, 43));
}

#[test]
fn alphabets_have_their_documented_sizes() {
    assert_eq!(Alphabet::Lowercase.symbols().len(), 26);
    assert_eq!(Alphabet::Letters.symbols().len(), 52);
    assert_eq!(Alphabet::Whitespace.symbols(), b" \t\n\r\x0b\x0c");
    assert_eq!(Alphabet::Printable.symbols().len(), 100);

    let extended: BTreeSet<u8> = Alphabet::Extended.symbols().iter().copied().collect();
    assert_eq!(extended.len(), 256);
}

// ------------------------
// Full width
// ------------------------

#[test]
fn boundary_groups_cover_every_byte_value() {
    let generator = FullWidthFill::new(settings(80));

    for (number, fillers, tail) in [
        (3, 80, &b""[..]),
        (4, 81, b""),
        (5, 80, b"a\nb"),
        (6, 81, b"a\nb"),
    ] {
        let units = group(&generator, number, 0);
        assert_eq!(units.len(), 256);

        let bytes: BTreeSet<u8> = units.iter().map(|u| u.bytes[fillers]).collect();
        assert_eq!(bytes.len(), 256, "group {number}");

        for unit in &units {
            assert!(unit.bytes[..fillers].iter().all(|&b| b == b'a'));
            assert_eq!(&unit.bytes[fillers + 1..unit.bytes.len() - 1], tail);
        }
    }
}

#[test]
fn boundary_line_ambiguity_follows_the_byte() {
    let generator = FullWidthFill::new(settings(80));

    assert!(!generator.boundary_line(80, b'x', false).expectation.unwrap().ambiguous);
    assert!(generator.boundary_line(80, 0x1b, false).expectation.unwrap().ambiguous);
    assert!(generator.boundary_line(80, 0x80, true).expectation.unwrap().ambiguous);
    assert!(generator.boundary_line(80, b'\n', true).expectation.unwrap().ambiguous);
}

#[test]
fn boundary_line_counts_continuation_rows() {
    let generator = FullWidthFill::new(settings(10));

    // the byte and the first continuation byte spill onto a second row, "b" takes a third
    let unit = generator.boundary_line(10, b'x', true);
    assert_eq!(unit.bytes, b"aaaaaaaaaaxa\nb\n");
    assert_eq!(unit.expectation.unwrap().rows, 3);

    let unit = generator.boundary_line(9, b'x', false);
    assert_eq!(unit.expectation.unwrap().rows, 1);
}

#[test]
fn multiples_groups_use_lowercase() {
    let generator = FullWidthFill::new(small_settings(7));
    for number in [1, 2] {
        for unit in group(&generator, number, 9) {
            assert!(unit.body().iter().all(u8::is_ascii_lowercase));
            assert!(!unit.expectation.unwrap().ambiguous);
        }
    }
}

proptest! {
    #[test]
    fn full_width_lengths_are_exact_multiples(
        columns in 1usize..400,
        repeats in 1usize..4,
        multiples in 1usize..12,
    ) {
        let run = RunConfig {
            repeats,
            full_width_multiples: multiples,
            ..RunConfig::default()
        };
        let width = TerminalWidth::new(columns).unwrap();
        let generator = FullWidthFill::new(GeneratorSettings::new(width, &run));

        let exact: Vec<usize> = generator.lengths(0).collect();
        prop_assert_eq!(exact.len(), multiples * repeats);
        for (k, len) in exact.iter().enumerate() {
            prop_assert_eq!(*len, columns * (k / repeats + 1));
        }

        for (exact, over) in generator.lengths(0).zip(generator.lengths(1)) {
            prop_assert_eq!(over, exact + 1);
        }
    }

    #[test]
    fn multiple_lines_predict_their_rows(
        columns in 1usize..200,
        seed in proptest::prelude::any::<u64>(),
    ) {
        let run = RunConfig {
            repeats: 1,
            full_width_multiples: 4,
            ..RunConfig::default()
        };
        let width = TerminalWidth::new(columns).unwrap();
        let generator = FullWidthFill::new(GeneratorSettings::new(width, &run));

        for (i, unit) in group(&generator, 1, seed).iter().enumerate() {
            prop_assert_eq!(unit.body().len(), columns * (i + 1));
            prop_assert_eq!(unit.expectation.unwrap().rows, i + 1);
        }
        for (i, unit) in group(&generator, 2, seed).iter().enumerate() {
            prop_assert_eq!(unit.expectation.unwrap().rows, i + 2);
        }
    }

    // ------------------------
    // CSI commands
    // ------------------------

    #[test]
    fn commands_draw_from_boundary_params(
        seed in proptest::prelude::any::<u64>(),
        params in 1usize..4,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let command = CsiFuzz::command(&mut rng, params);
        let (fields, letter) = split_command(&command);

        prop_assert_eq!(fields.len(), params);
        for field in &fields {
            prop_assert!(BOUNDARY_PARAMS.contains(&field.as_str()), "{field:?}");
        }
        prop_assert!(letter.is_ascii_alphabetic());
    }

    #[test]
    fn sgr_stays_in_range(seed in proptest::prelude::any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let sgr = String::from_utf8(CsiFuzz::sgr(&mut rng)).unwrap();

        let param = sgr
            .strip_prefix("\x1b[")
            .and_then(|rest| rest.strip_suffix("mtest"))
            .unwrap();
        let value: u8 = param.parse().unwrap();
        prop_assert!(value <= SGR_MAX);
    }

    // ------------------------
    // DEC private modes
    // ------------------------

    #[test]
    fn dec_sequences_use_known_modes(seed in proptest::prelude::any::<u64>()) {
        let generator = DecModeFuzz::new(small_settings(80));
        let mut rng = StdRng::seed_from_u64(seed);
        let line = String::from_utf8(generator.sequence(&mut rng)).unwrap();

        let body = line.strip_prefix("test\x1b[?").unwrap();
        let (mode, suffix) = body.split_at(body.len() - 1);
        prop_assert!(suffix == "h" || suffix == "l");
        prop_assert!(generator.modes().contains(&mode.parse::<u16>().unwrap()));
    }
}

#[test]
fn csi_groups_vary_parameter_count() {
    let generator = CsiFuzz::new(small_settings(80));

    for (number, params) in [(1, 1), (2, 2)] {
        let units = group(&generator, number, 17);
        assert_eq!(units.len(), 20);
        for unit in units {
            assert!(unit.expectation.is_none());
            assert_eq!(split_command(unit.body()).0.len(), params);
        }
    }

    for unit in group(&generator, 3, 17) {
        assert!(unit.body().starts_with(b"\x1b["));
        assert!(unit.body().ends_with(b"mtest"));
    }
}

#[test]
fn private_mode_table() {
    let modes = private_modes();
    assert_eq!(modes.len(), 100 + 62 + 1);
    assert!(modes.contains(&0));
    assert!(modes.contains(&99));
    assert!(!modes.contains(&100));
    assert!(modes.contains(&1000));
    assert!(modes.contains(&1061));
    assert!(!modes.contains(&1062));
    assert_eq!(modes.last(), Some(&BRACKETED_PASTE));
}

#[test]
fn dec_group_honours_fuzz_count() {
    let generator = DecModeFuzz::new(small_settings(80));
    let units = group(&generator, 1, 23);
    assert_eq!(units.len(), 20);
    assert!(units.iter().all(|u| u.expectation.is_none()));
}

#[test]
fn simple_fill_ignores_group_zero() {
    let generator = SimpleFill::new(small_settings(10));
    assert!(group(&generator, 0, 1).is_empty());
    assert!(group(&generator, 6, 1).is_empty());
    assert_eq!(group(&generator, 5, 1).len(), 10);
}
