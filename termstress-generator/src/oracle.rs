// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

use termstress_common::config::WrapRowPolicy;
use termstress_common::cursor::CursorPosition;

use crate::generators::Expectation;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VerificationFailure {
    pub expected: CursorPosition,
    pub actual: CursorPosition,
    /// Printable rendering of the unit that was written.
    pub context: String,
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cursor in wrong position {} should be {}. Input: {}",
            self.actual, self.expected, self.context
        )
    }
}

impl std::error::Error for VerificationFailure {}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VerificationResult {
    Pass,
    Fail(VerificationFailure),
}

impl VerificationResult {
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Strict comparison of both coordinates. Nothing is special-cased for wide,
/// combining or control bytes.
#[must_use]
pub fn verify(
    expected: CursorPosition,
    actual: CursorPosition,
    context: &str,
) -> VerificationResult {
    if expected == actual {
        VerificationResult::Pass
    } else {
        VerificationResult::Fail(VerificationFailure {
            expected,
            actual,
            context: context.to_string(),
        })
    }
}

/// Where the cursor should be after a unit written at `start`.
///
/// Every unit ends in a newline, so the column is always the one the line
/// started in. The row depends on `policy`.
#[must_use]
pub fn expected_position(
    start: CursorPosition,
    expectation: Expectation,
    policy: WrapRowPolicy,
    screen_rows: Option<usize>,
) -> CursorPosition {
    match policy {
        WrapRowPolicy::Fixed => start,
        WrapRowPolicy::Advance => start.advanced_by(expectation.rows, screen_rows),
    }
}
