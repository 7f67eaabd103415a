// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)] // Allow multiple versions from transitive dependencies
#![allow(clippy::cargo_common_metadata)] // Metadata is inherited from workspace

// #![warn(missing_docs)]

#[macro_use]
extern crate tracing;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use termstress_common::args::{Args, Command, RunArgs};
use termstress_common::config::{Config, load_config};
use termstress_generator::disk_bench::DiskBenchCommand;
use termstress_generator::io::{ChannelResponseSource, InputModeGuard};
use termstress_generator::orchestrator::{RunPlan, Runner};
use termstress_generator::replay::{ReplayOptions, replay_file};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, layer},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

fn main() -> ExitCode {
    // use env for filtering
    // example
    // RUST_LOG=none,termstress_generator=debug termstress $(tput cols)

    let args = match Args::parse_from_iter(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            // --help and --version land here too. Logging is not set up yet.
            if let Err(print_err) = e.print() {
                eprintln!("Failed to print usage: {print_err}");
            }
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(&args);

    info!(
        "Starting termstress {}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_BUILD_TIMESTAMP")
    );

    let cfg = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("Failed to load config: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    debug!("Loaded config: {cfg:#?}");

    let res = match &args.command {
        None => run_stress(&args.run, cfg),
        Some(Command::Replay {
            log,
            offset,
            realtime,
        }) => run_replay(log, *offset, *realtime, &cfg),
        Some(Command::DiskBench { device }) => {
            let mut disk = cfg.disk;
            if let Some(device) = device {
                disk.device.clone_from(device);
            }
            DiskBenchCommand::from(&disk)
                .run()
                .context("Disk benchmark failed")
        }
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs never go to stdout: that is the stream under test.
fn init_logging(args: &Args) {
    let default_level = if args.show_all_debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry().with(env_filter);

    fn std_err_layer<S>() -> impl tracing_subscriber::Layer<S>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        layer()
            .with_writer(std::io::stderr)
            .with_line_number(true)
            .with_span_events(fmt::format::FmtSpan::ACTIVE)
            .compact()
    }

    if args.write_logs_to_file {
        let file_appender = match RollingFileAppender::builder()
            .rotation(Rotation::HOURLY) // rotate log files once every hour
            .max_log_files(2)
            .filename_prefix("termstress")
            .filename_suffix("log")
            .build("./")
        {
            Ok(appender) => appender,
            Err(e) => {
                subscriber.with(std_err_layer()).init();
                error!("Failed to create file appender: {e}");
                return;
            }
        };

        subscriber
            .with(layer().with_ansi(false).with_writer(file_appender))
            .with(std_err_layer())
            .init();
    } else {
        subscriber.with(std_err_layer()).init();
    }
}

fn run_stress(run_args: &RunArgs, mut cfg: Config) -> Result<()> {
    cfg.apply_run_args(run_args)
        .context("Invalid run options")?;

    let width = run_args.terminal_width();
    let plan = RunPlan::new(width, &cfg);
    info!("Using seed {} (pass --seed {} to reproduce)", plan.seed, plan.seed);

    let _input_mode = InputModeGuard::enable().context("Failed to configure terminal input")?;
    let input = ChannelResponseSource::stdin().context("Failed to start input reader")?;
    let out = std::io::stdout().lock();

    let mut runner = Runner::new(out, input, plan);
    runner.run()?;
    Ok(())
}

fn run_replay(log: &Path, offset: Option<usize>, realtime: bool, cfg: &Config) -> Result<()> {
    let mut options = ReplayOptions::from(&cfg.replay);
    if let Some(offset) = offset {
        options.payload_offset = offset;
    }
    options.realtime |= realtime;

    let mut out = std::io::stdout().lock();
    let stats = replay_file(log, &mut out, &options)?;
    info!(
        "Replay finished: {} bytes written, {} lines skipped",
        stats.replayed, stats.skipped
    );
    Ok(())
}
