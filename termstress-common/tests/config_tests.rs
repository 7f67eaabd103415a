// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::NamedTempFile;
use termstress_common::args::RunArgs;
use termstress_common::config::{
    Config, ConfigError, ConfigSources, CursorCheck, FamilyKind, PacingConfig, WrapRowPolicy,
};

/// Only the explicit file, never the developer's own config.
fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    ConfigSources::default().load(explicit)
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn defaults_match_the_stress_profile() {
    let cfg = Config::default();
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.run.seed, None);
    assert_eq!(cfg.run.max_line_length, 500);
    assert_eq!(cfg.run.repeats, 10);
    assert_eq!(cfg.run.full_width_multiples, 9);
    assert_eq!(cfg.run.fuzz_count, 500);
    assert_eq!(cfg.run.query_timeout(), Duration::from_secs(2));
    assert_eq!(cfg.run.cursor_check, CursorCheck::All);
    assert_eq!(cfg.run.wrap_rows, WrapRowPolicy::Fixed);
    assert_eq!(cfg.run.families, FamilyKind::ALL.to_vec());
    assert_eq!(cfg.pacing.group_settle(), Duration::from_millis(500));
    assert_eq!(cfg.replay.payload_offset, 7);
    assert_eq!(cfg.replay.input_tag, "stdin");
}

#[test]
fn disabled_pacing_has_no_delays() {
    let pacing = PacingConfig::disabled();
    assert_eq!(pacing.width_warning(), Duration::ZERO);
    assert_eq!(pacing.start(), Duration::ZERO);
    assert_eq!(pacing.group_settle(), Duration::ZERO);
    assert_eq!(pacing.counting(), Duration::ZERO);
}

#[test]
fn explicit_file_overrides_sections() {
    let file = write_config(
        r#"
[run]
seed = 99
max_line_length = 40
cursor_check = "unambiguous"
wrap_rows = "advance"
families = ["simple", "csi_commands"]

[pacing]
enabled = false
"#,
    );

    let cfg = load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.run.seed, Some(99));
    assert_eq!(cfg.run.max_line_length, 40);
    // unspecified keys keep their defaults inside a given section
    assert_eq!(cfg.run.repeats, 10);
    assert_eq!(cfg.run.cursor_check, CursorCheck::Unambiguous);
    assert_eq!(cfg.run.wrap_rows, WrapRowPolicy::Advance);
    assert_eq!(
        cfg.run.families,
        vec![FamilyKind::Simple, FamilyKind::CsiCommands]
    );
    assert!(!cfg.pacing.enabled);
    assert_eq!(cfg.replay.payload_offset, 7);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        load_config(Some(&path)),
        Err(ConfigError::Missing(_))
    ));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[run\nseed = ");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn out_of_range_values_fail_validation() {
    let file = write_config("[run]\nrepeats = 0\n");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(ConfigError::Validation(_))
    ));

    let file = write_config("[run]\nfamilies = []\n");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(ConfigError::Validation(_))
    ));

    let file = write_config("version = 0\n");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn run_args_override_the_file() {
    let mut cfg = Config::default();
    let args = RunArgs {
        seed: Some(7),
        repeats: Some(2),
        cursor_check: Some(CursorCheck::Off),
        families: vec![FamilyKind::DecModes],
        no_pacing: true,
        ..RunArgs::default()
    };

    cfg.apply_run_args(&args).unwrap();
    assert_eq!(cfg.run.seed, Some(7));
    assert_eq!(cfg.run.repeats, 2);
    assert_eq!(cfg.run.cursor_check, CursorCheck::Off);
    assert_eq!(cfg.run.families, vec![FamilyKind::DecModes]);
    assert!(!cfg.pacing.enabled);
}

#[test]
fn empty_run_args_change_nothing() {
    let mut cfg = Config::default();
    cfg.apply_run_args(&RunArgs::default()).unwrap();
    assert_eq!(cfg.run.families, FamilyKind::ALL.to_vec());
    assert!(cfg.pacing.enabled);
}

#[test]
fn invalid_run_args_are_rejected() {
    let mut cfg = Config::default();
    let args = RunArgs {
        query_timeout_ms: Some(0),
        ..RunArgs::default()
    };
    assert!(matches!(
        cfg.apply_run_args(&args),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn family_names_match_progress_markers() {
    let names: Vec<_> = FamilyKind::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(
        names,
        vec!["simple", "full_width", "csi_commands", "dec_modes"]
    );
}

#[test]
fn config_serializes_back_to_toml() {
    let cfg = Config::default();
    let text = toml::to_string(&cfg).unwrap();
    assert!(text.contains("[run]"));
    assert!(text.contains("cursor_check = \"all\""));
}

#[test]
fn layers_apply_in_order() {
    let user = write_config("[run]\nrepeats = 3\nfuzz_count = 7\n");
    let env = write_config("[run]\nrepeats = 4\n");
    let explicit = write_config("[pacing]\nenabled = false\n");

    let sources = ConfigSources {
        user: Some(user.path().to_path_buf()),
        env: Some(env.path().to_path_buf()),
    };

    // sections replace whole sections of earlier layers
    let cfg = sources.load(None).unwrap();
    assert_eq!(cfg.run.repeats, 4);
    assert_eq!(cfg.run.fuzz_count, 500);

    let cfg = sources.load(Some(explicit.path())).unwrap();
    assert_eq!(cfg.run.repeats, 4);
    assert!(!cfg.pacing.enabled);
}

#[test]
fn absent_layers_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let sources = ConfigSources {
        user: Some(dir.path().join("config.toml")),
        env: Some(dir.path().join("missing.toml")),
    };

    let cfg = sources.load(None).unwrap();
    assert_eq!(cfg.run.repeats, 10);
}
