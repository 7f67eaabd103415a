// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use thiserror::Error;

use crate::oracle::VerificationFailure;

/// Failures of a single cursor position query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to write cursor query: {0}")]
    Io(#[from] std::io::Error),
    #[error("No cursor position report within {timeout:?} (received {:?})", .partial.escape_ascii().to_string())]
    TimedOut { timeout: Duration, partial: Vec<u8> },
    #[error("Input closed before the cursor position report ended (received {:?})", .partial.escape_ascii().to_string())]
    InputClosed { partial: Vec<u8> },
    #[error("Cursor position report exceeded {limit} bytes (received {:?})", .partial.escape_ascii().to_string())]
    ResponseTooLong { limit: usize, partial: Vec<u8> },
    #[error("Malformed cursor position report: {:?}", .0.escape_ascii().to_string())]
    MalformedResponse(Vec<u8>),
}

/// Reasons a stress run stops early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to write to the terminal under test: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cursor check failed for input {context}: {source}")]
    Query {
        #[source]
        source: QueryError,
        context: String,
    },
    #[error("{0}")]
    Verification(Box<VerificationFailure>),
}
