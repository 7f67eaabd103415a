// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::config::{CursorCheck, FamilyKind, WrapRowPolicy};
use crate::terminal_size::TerminalWidth;

/// Terminal emulator stress tester.
///
/// Writes adversarial byte streams to stdout and checks the cursor position the
/// terminal reports back on stdin.
/// Example: `termstress $(tput cols)`
#[derive(Debug, Parser)]
#[command(name = "termstress", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,

    /// Config file applied on top of the user config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of `RUST_LOG`
    #[arg(long, global = true)]
    pub show_all_debug: bool,

    /// Also write logs to an hourly rotating file in the current directory
    #[arg(long, global = true)]
    pub write_logs_to_file: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a captured debug log to stdout
    Replay {
        /// Log file to replay
        log: PathBuf,
        /// Byte offset of the payload inside each record
        #[arg(long)]
        offset: Option<usize>,
        /// Sleep between records according to their timestamps
        #[arg(long)]
        realtime: bool,
    },
    /// Run the disk throughput benchmark
    DiskBench {
        /// Block device to benchmark
        #[arg(long)]
        device: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Clone, ClapArgs)]
pub struct RunArgs {
    /// Column width of the terminal under test. Falls back to 80.
    ///
    /// Kept as text so a bad value degrades to the default instead of failing.
    pub width: Option<String>,

    /// Seed for the random generators; drawn from entropy when absent
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exclusive upper bound of the simple family's line lengths
    #[arg(long)]
    pub max_line_length: Option<usize>,

    /// Strings emitted per length or width multiple
    #[arg(long)]
    pub repeats: Option<usize>,

    /// Sequences emitted per control sequence group
    #[arg(long)]
    pub fuzz_count: Option<usize>,

    /// How long to wait for a cursor position report
    #[arg(long)]
    pub query_timeout_ms: Option<u64>,

    /// Which units are followed by a cursor check
    #[arg(long, value_enum)]
    pub cursor_check: Option<CursorCheck>,

    /// How the expected row is computed for checked units
    #[arg(long, value_enum)]
    pub wrap_rows: Option<WrapRowPolicy>,

    /// Screen height, clamps the expected row when rows advance
    #[arg(long)]
    pub screen_rows: Option<usize>,

    /// Run only these families (repeatable)
    #[arg(long = "family", value_enum)]
    pub families: Vec<FamilyKind>,

    /// Skip every settle delay
    #[arg(long)]
    pub no_pacing: bool,
}

impl Args {
    /// Parse the arguments
    ///
    /// # Errors
    /// Will return an error if the arguments are invalid
    pub fn parse_from_iter<I, T>(it: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        trace!("Parsing args");
        Self::try_parse_from(it)
    }
}

impl RunArgs {
    /// The terminal width, defaulting with a warning when missing or invalid.
    #[must_use]
    pub fn terminal_width(&self) -> TerminalWidth {
        TerminalWidth::parse_or_default(self.width.as_deref())
    }
}
