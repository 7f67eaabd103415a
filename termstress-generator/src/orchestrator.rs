// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io::Write;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use termstress_common::config::{
    Config, CursorCheck, FamilyKind, PacingConfig, RunConfig, WrapRowPolicy,
};
use termstress_common::cursor::CursorPosition;
use termstress_common::terminal_size::{DEFAULT_WIDTH, TerminalWidth};

use crate::cpr::{QueryLimits, query_cursor};
use crate::error::RunError;
use crate::generators::{Expectation, GeneratorSettings, TestUnit, generator_for};
use crate::io::ResponseSource;
use crate::oracle::{VerificationResult, expected_position, verify};

const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Everything a run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub width: TerminalWidth,
    pub seed: u64,
    pub run: RunConfig,
    pub pacing: PacingConfig,
}

impl RunPlan {
    /// Resolve a plan from the loaded config, drawing a seed from entropy if
    /// none was configured.
    #[must_use]
    pub fn new(width: TerminalWidth, config: &Config) -> Self {
        let seed = config.run.seed.unwrap_or_else(rand::random);

        Self {
            width,
            seed,
            run: config.run.clone(),
            pacing: config.pacing.clone(),
        }
    }

    /// Families to run, in run order.
    pub fn families(&self) -> impl Iterator<Item = FamilyKind> {
        FamilyKind::ALL
            .into_iter()
            .filter(|kind| self.run.families.contains(kind))
    }
}

/// Explicit state threaded through every check of a run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Position captured before anything was generated. Reported only.
    pub start: Option<CursorPosition>,
    /// Position confirmed by the last check, still valid because nothing has
    /// been written since.
    pub last_known: Option<CursorPosition>,
    pub units_written: usize,
    pub checks_passed: usize,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunSummary {
    pub seed: u64,
    pub start: Option<CursorPosition>,
    pub units_written: usize,
    pub checks_passed: usize,
    pub elapsed: Duration,
}

/// Cursor check settings taken from the run config.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct CheckPolicy {
    mode: CursorCheck,
    wrap_rows: WrapRowPolicy,
    screen_rows: Option<usize>,
}

impl CheckPolicy {
    fn selects(self, unit: &TestUnit) -> Option<Expectation> {
        let expectation = unit.expectation?;

        match self.mode {
            CursorCheck::Off => None,
            CursorCheck::Unambiguous if expectation.ambiguous => None,
            CursorCheck::Unambiguous | CursorCheck::All => Some(expectation),
        }
    }
}

/// The duplex stream to the terminal under test plus the state of the checks
/// made over it.
struct TerminalLink<W: Write, S: ResponseSource> {
    out: W,
    input: S,
    limits: QueryLimits,
    checks: CheckPolicy,
    ctx: RunContext,
}

impl<W: Write, S: ResponseSource> TerminalLink<W, S> {
    fn write_flushed(&mut self, bytes: &[u8]) -> Result<(), RunError> {
        self.out.write_all(bytes)?;
        self.out.flush()?;
        Ok(())
    }

    fn run_unit(&mut self, unit: &TestUnit) -> Result<(), RunError> {
        let Some(expectation) = self.checks.selects(unit) else {
            self.write_flushed(&unit.bytes)?;
            self.ctx.units_written += 1;
            self.ctx.last_known = None;
            return Ok(());
        };

        let before = match self.ctx.last_known {
            Some(pos) => pos,
            None => self.query(unit)?,
        };

        self.write_flushed(&unit.bytes)?;
        self.ctx.units_written += 1;

        let actual = self.query(unit)?;
        let expected = expected_position(
            before,
            expectation,
            self.checks.wrap_rows,
            self.checks.screen_rows,
        );

        match verify(expected, actual, &unit.describe()) {
            VerificationResult::Pass => {
                self.ctx.checks_passed += 1;
                self.ctx.last_known = Some(actual);
                Ok(())
            }
            VerificationResult::Fail(failure) => {
                error!("{failure}");
                writeln!(self.out, "{YELLOW}{failure}{RESET}")?;
                self.out.flush()?;
                Err(RunError::Verification(Box::new(failure)))
            }
        }
    }

    fn query(&mut self, unit: &TestUnit) -> Result<CursorPosition, RunError> {
        query_cursor(&mut self.out, &mut self.input, self.limits).map_err(|source| {
            RunError::Query {
                source,
                context: unit.describe(),
            }
        })
    }
}

/// Drives the terminal under test: writes every selected family in order and
/// checks the cursor after the units the check policy selects. Stops at the
/// first failed check.
pub struct Runner<W: Write, S: ResponseSource> {
    plan: RunPlan,
    rng: StdRng,
    link: TerminalLink<W, S>,
}

impl<W: Write, S: ResponseSource> Runner<W, S> {
    pub fn new(out: W, input: S, plan: RunPlan) -> Self {
        let link = TerminalLink {
            out,
            input,
            limits: QueryLimits::from(&plan.run),
            checks: CheckPolicy {
                mode: plan.run.cursor_check,
                wrap_rows: plan.run.wrap_rows,
                screen_rows: plan.run.screen_rows,
            },
            ctx: RunContext::default(),
        };

        Self {
            rng: StdRng::seed_from_u64(plan.seed),
            plan,
            link,
        }
    }

    #[must_use]
    pub const fn context(&self) -> &RunContext {
        &self.link.ctx
    }

    /// # Errors
    /// Will return an error if writing fails, if a cursor check cannot be
    /// completed, or on the first cursor position mismatch
    pub fn run(&mut self) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let families: Vec<FamilyKind> = self.plan.families().collect();
        info!(
            "Stress run: width {} seed {} families {families:?}",
            self.plan.width.columns(),
            self.plan.seed,
        );

        self.announce_width()?;
        self.capture_start()?;

        for kind in families {
            self.run_family(kind)?;
        }

        let ctx = &self.link.ctx;
        let summary = RunSummary {
            seed: self.plan.seed,
            start: ctx.start,
            units_written: ctx.units_written,
            checks_passed: ctx.checks_passed,
            elapsed: started.elapsed(),
        };

        info!(
            "Run complete: {} units written, {} cursor checks passed in {:.2?} (seed {})",
            summary.units_written, summary.checks_passed, summary.elapsed, summary.seed
        );

        Ok(summary)
    }

    fn announce_width(&mut self) -> Result<(), RunError> {
        if !self.plan.width.is_assumed() {
            return Ok(());
        }

        warn!("No terminal width given, assuming {DEFAULT_WIDTH}");
        let warning = format!(
            "{YELLOW}Warning Add $(tput cols) to your command, assuming {DEFAULT_WIDTH}{RESET}\n"
        );
        self.link.write_flushed(warning.as_bytes())?;
        pause(self.plan.pacing.width_warning());
        Ok(())
    }

    fn capture_start(&mut self) -> Result<(), RunError> {
        let link = &mut self.link;
        link.ctx.start = match query_cursor(&mut link.out, &mut link.input, link.limits) {
            Ok(pos) => Some(pos),
            Err(e) => {
                warn!("Could not capture the starting cursor position: {e}");
                None
            }
        };

        let line = link
            .ctx
            .start
            .map_or_else(|| "Starting (unknown)\n".to_string(), |pos| format!("Starting {pos}\n"));
        link.write_flushed(line.as_bytes())?;
        pause(self.plan.pacing.start());
        Ok(())
    }

    fn run_family(&mut self, kind: FamilyKind) -> Result<(), RunError> {
        let settings = GeneratorSettings::new(self.plan.width, &self.plan.run);
        let generator = generator_for(kind, settings);

        for number in 1..=generator.group_count() {
            debug!("Starting {kind} group {number}");
            self.link
                .write_flushed(format!("Starting {kind} test {number}\n").as_bytes())?;
            self.link.ctx.last_known = None;
            pause(self.plan.pacing.group_settle());

            let group = generator.group(number, &mut self.rng);
            for unit in group.units {
                self.link.run_unit(&unit)?;
                if group.paced {
                    pause(self.plan.pacing.counting());
                }
            }
        }

        self.link.write_flushed(generator.epilogue())?;
        self.link.ctx.last_known = None;
        Ok(())
    }

    /// Give back the output stream, e.g. to inspect what was written.
    pub fn into_output(self) -> W {
        self.link.out
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}
