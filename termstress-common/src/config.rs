// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use directories::ProjectDirs;

use crate::args::RunArgs;

/// ---------------------------------------------------------------------------------------------
///  Top-level Config Structure
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub run: RunConfig,
    pub pacing: PacingConfig,
    pub replay: ReplayConfig,
    pub disk: DiskConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            run: RunConfig::default(),
            pacing: PacingConfig::default(),
            replay: ReplayConfig::default(),
            disk: DiskConfig::default(),
        }
    }
}

/// ---------------------------------------------------------------------------------------------
///  Run
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Exclusive upper bound of the line lengths the simple family walks through.
    pub max_line_length: usize,
    /// Random strings emitted per length / multiplier.
    pub repeats: usize,
    /// Highest multiple of the terminal width the full-width family fills.
    pub full_width_multiples: usize,
    /// Sequences emitted per CSI / SGR / DEC mode group.
    pub fuzz_count: usize,
    pub query_timeout_ms: u64,
    pub max_response_len: usize,
    pub cursor_check: CursorCheck,
    pub wrap_rows: WrapRowPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_rows: Option<usize>,
    pub families: Vec<FamilyKind>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_line_length: 500,
            repeats: 10,
            full_width_multiples: 9,
            fuzz_count: 500,
            query_timeout_ms: 2000,
            max_response_len: 32,
            cursor_check: CursorCheck::default(),
            wrap_rows: WrapRowPolicy::default(),
            screen_rows: None,
            families: FamilyKind::ALL.to_vec(),
        }
    }
}

impl RunConfig {
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Which test units are followed by a cursor query and checked.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CursorCheck {
    /// Never query after a unit.
    Off,
    /// Only units whose cell count is not affected by control or 8-bit bytes.
    Unambiguous,
    /// Every unit that carries an expectation, with strict equality.
    #[default]
    All,
}

/// How the expected row is derived after a checked unit.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum WrapRowPolicy {
    /// The cursor returns to the row it started on (output scrolling at the bottom).
    #[default]
    Fixed,
    /// The cursor moves down by the rows the unit occupied.
    Advance,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum FamilyKind {
    Simple,
    FullWidth,
    CsiCommands,
    DecModes,
}

impl FamilyKind {
    /// Every family, in the order a run executes them.
    pub const ALL: [Self; 4] = [
        Self::Simple,
        Self::FullWidth,
        Self::CsiCommands,
        Self::DecModes,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::FullWidth => "full_width",
            Self::CsiCommands => "csi_commands",
            Self::DecModes => "dec_modes",
        }
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// ---------------------------------------------------------------------------------------------
///  Pacing
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub enabled: bool,
    pub width_warning_ms: u64,
    pub start_ms: u64,
    pub group_settle_ms: u64,
    pub counting_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width_warning_ms: 3000,
            start_ms: 1000,
            group_settle_ms: 500,
            counting_ms: 100,
        }
    }
}

impl PacingConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    const fn delay(&self, ms: u64) -> Duration {
        if self.enabled {
            Duration::from_millis(ms)
        } else {
            Duration::ZERO
        }
    }

    #[must_use]
    pub const fn width_warning(&self) -> Duration {
        self.delay(self.width_warning_ms)
    }

    #[must_use]
    pub const fn start(&self) -> Duration {
        self.delay(self.start_ms)
    }

    #[must_use]
    pub const fn group_settle(&self) -> Duration {
        self.delay(self.group_settle_ms)
    }

    #[must_use]
    pub const fn counting(&self) -> Duration {
        self.delay(self.counting_ms)
    }
}

/// ---------------------------------------------------------------------------------------------
///  Replay
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Byte offset of the payload inside each record.
    pub payload_offset: usize,
    /// Records starting with this tag were typed input and are skipped.
    pub input_tag: String,
    pub realtime: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            payload_offset: 7,
            input_tag: "stdin".to_string(),
            realtime: false,
        }
    }
}

/// ---------------------------------------------------------------------------------------------
///  Disk benchmark
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub device: PathBuf,
    pub use_sudo: bool,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/sda"),
            use_sudo: true,
        }
    }
}

/// ---------------------------------------------------------------------------------------------
///  Partial config (for layered merging)
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigPartial {
    pub version: Option<u32>,
    pub run: Option<RunConfig>,
    pub pacing: Option<PacingConfig>,
    pub replay: Option<ReplayConfig>,
    pub disk: Option<DiskConfig>,
}

impl Config {
    fn apply_partial(&mut self, partial: ConfigPartial) {
        if let Some(v) = partial.version {
            self.version = v;
        }
        if let Some(run) = partial.run {
            self.run = run;
        }
        if let Some(pacing) = partial.pacing {
            self.pacing = pacing;
        }
        if let Some(replay) = partial.replay {
            self.replay = replay;
        }
        if let Some(disk) = partial.disk {
            self.disk = disk;
        }
    }

    /// Apply command line overrides for a stress run on top of the loaded layers.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if the result is out of range
    pub fn apply_run_args(&mut self, args: &RunArgs) -> Result<(), ConfigError> {
        let run = &mut self.run;

        if let Some(seed) = args.seed {
            run.seed = Some(seed);
        }
        if let Some(len) = args.max_line_length {
            run.max_line_length = len;
        }
        if let Some(repeats) = args.repeats {
            run.repeats = repeats;
        }
        if let Some(count) = args.fuzz_count {
            run.fuzz_count = count;
        }
        if let Some(timeout) = args.query_timeout_ms {
            run.query_timeout_ms = timeout;
        }
        if let Some(check) = args.cursor_check {
            run.cursor_check = check;
        }
        if let Some(policy) = args.wrap_rows {
            run.wrap_rows = policy;
        }
        if let Some(rows) = args.screen_rows {
            run.screen_rows = Some(rows);
        }
        if !args.families.is_empty() {
            run.families.clone_from(&args.families);
        }
        if args.no_pacing {
            self.pacing.enabled = false;
        }

        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 {
            return Err(ConfigError::Validation("version must be >= 1".to_string()));
        }

        if self.run.max_line_length < 2 {
            return Err(ConfigError::Validation(format!(
                "run.max_line_length={} must be >= 2",
                self.run.max_line_length
            )));
        }

        if self.run.repeats == 0 {
            return Err(ConfigError::Validation("run.repeats must be >= 1".to_string()));
        }

        if self.run.query_timeout_ms == 0 {
            return Err(ConfigError::Validation("run.query_timeout_ms must be >= 1".to_string()));
        }

        // ESC [ ; R plus one digit for each field
        if self.run.max_response_len < 6 {
            return Err(ConfigError::Validation(format!(
                "run.max_response_len={} must be >= 6",
                self.run.max_response_len
            )));
        }

        if self.run.families.is_empty() {
            return Err(ConfigError::Validation(
                "run.families must name at least one family".to_string(),
            ));
        }

        if self.run.screen_rows == Some(0) {
            return Err(ConfigError::Validation("run.screen_rows must be >= 1".to_string()));
        }

        Ok(())
    }
}

/// ---------------------------------------------------------------------------------------------
///  Errors
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config file {0} does not exist")]
    Missing(PathBuf),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// ---------------------------------------------------------------------------------------------
///  Public loader
/// ---------------------------------------------------------------------------------------------
/// Files layered on top of the built-in defaults, lowest precedence first.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ConfigSources {
    /// Platform user config. Skipped when the file does not exist.
    pub user: Option<PathBuf>,
    /// Path from `TERMSTRESS_CONFIG`. Skipped with a warning when it is not a file.
    pub env: Option<PathBuf>,
}

impl ConfigSources {
    /// The platform user config path and `TERMSTRESS_CONFIG`.
    #[must_use]
    pub fn discover() -> Self {
        Self {
            user: user_config_path(),
            env: env::var_os("TERMSTRESS_CONFIG").map(PathBuf::from),
        }
    }

    /// Apply the layers in order: built-in defaults, `user`, `env`, and finally
    /// `explicit_path`.
    ///
    /// # Errors
    /// Returns `ConfigError` if any config file cannot be read or parsed, if the explicit path
    /// does not exist, or if the final config is invalid.
    pub fn load(&self, explicit_path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut cfg = Config::default();

        // 1. Platform-specific user config
        if let Some(user_path) = &self.user
            && user_path.is_file()
        {
            debug!("Loading user config from {}", user_path.display());
            cfg.apply_partial(load_partial(user_path)?);
        }

        // 2. TERMSTRESS_CONFIG= override
        if let Some(path) = &self.env {
            if path.is_file() {
                debug!("Loading config from TERMSTRESS_CONFIG={}", path.display());
                cfg.apply_partial(load_partial(path)?);
            } else {
                warn!(
                    "TERMSTRESS_CONFIG points at {}, which is not a file",
                    path.display()
                );
            }
        }

        // 3. Explicit CLI override
        if let Some(path) = explicit_path {
            if !path.is_file() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }

            cfg.apply_partial(load_partial(path)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

/// Loads the configuration from the discovered [`ConfigSources`] plus `explicit_path`.
///
/// # Errors
/// Returns `ConfigError` if any config file cannot be read or parsed, if the explicit path does
/// not exist, or if the final config is invalid.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, ConfigError> {
    ConfigSources::discover().load(explicit_path)
}

/// ---------------------------------------------------------------------------------------------
///  Helpers
/// ---------------------------------------------------------------------------------------------
fn load_partial(path: &Path) -> Result<ConfigPartial, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// User config paths:
///
/// Linux:   `$XDG_CONFIG_HOME/termstress/config.toml`
/// macOS:   ~/Library/Application Support/io.github.fredsystems.termstress/config.toml
/// Windows: %APPDATA%\fredsystems\termstress\config\config.toml
fn user_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("io.github", "fredsystems", "termstress")?;
    Some(dirs.config_dir().join("config.toml"))
}
