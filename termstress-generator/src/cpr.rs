// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io::Write;
use std::time::{Duration, Instant};

use termstress_common::config::RunConfig;
use termstress_common::cursor::CursorPosition;

use crate::error::QueryError;
use crate::io::{InputEvent, ResponseSource};

/// Device Status Report, cursor position request
///
/// ESC [ 6 n
pub const CURSOR_QUERY: &[u8] = b"\x1b[6n";

/// Final byte of a cursor position report
///
/// ESC [ Pr ; Pc R
pub const REPORT_TERMINATOR: u8 = b'R';

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct QueryLimits {
    pub timeout: Duration,
    pub max_len: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self::from(&RunConfig::default())
    }
}

impl From<&RunConfig> for QueryLimits {
    fn from(run: &RunConfig) -> Self {
        Self {
            timeout: run.query_timeout(),
            max_len: run.max_response_len,
        }
    }
}

/// Ask the terminal where its cursor is.
///
/// Any bytes still buffered from an earlier, abandoned query are discarded
/// first so the report read here answers this request. Exactly one request is
/// written; there is no retry.
///
/// # Errors
/// Will return an error if the request cannot be written, if no complete report
/// arrives within `limits`, or if the report does not parse.
pub fn query_cursor<W, S>(
    out: &mut W,
    input: &mut S,
    limits: QueryLimits,
) -> Result<CursorPosition, QueryError>
where
    W: Write + ?Sized,
    S: ResponseSource + ?Sized,
{
    let stale = input.drain();
    if !stale.is_empty() {
        debug!(
            "Discarding {} stale input bytes before cursor query: {}",
            stale.len(),
            stale.escape_ascii()
        );
    }

    out.write_all(CURSOR_QUERY)?;
    out.flush()?;

    let response = read_report(input, limits)?;
    trace!("Cursor report: {}", response.escape_ascii());
    parse_cursor_report(&response)
}

fn read_report<S: ResponseSource + ?Sized>(
    input: &mut S,
    limits: QueryLimits,
) -> Result<Vec<u8>, QueryError> {
    let deadline = Instant::now() + limits.timeout;
    let mut buf = Vec::with_capacity(16);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());

        match input.next_byte(remaining) {
            InputEvent::Byte(byte) => {
                buf.push(byte);
                if byte == REPORT_TERMINATOR {
                    return Ok(buf);
                }
                if buf.len() >= limits.max_len {
                    return Err(QueryError::ResponseTooLong {
                        limit: limits.max_len,
                        partial: buf,
                    });
                }
            }
            InputEvent::TimedOut => {
                return Err(QueryError::TimedOut {
                    timeout: limits.timeout,
                    partial: buf,
                });
            }
            InputEvent::Closed => return Err(QueryError::InputClosed { partial: buf }),
        }
    }
}

/// Parse a cursor position report.
///
/// The grammar is `[ row ; col R` at the end of the buffer; anything before the
/// last `[` (the ESC, stray input) is ignored. The first number is the row and
/// the second the column.
///
/// # Errors
/// Will return `QueryError::MalformedResponse` if the buffer does not match
pub fn parse_cursor_report(buf: &[u8]) -> Result<CursorPosition, QueryError> {
    let malformed = || QueryError::MalformedResponse(buf.to_vec());

    let body = buf
        .strip_suffix(&[REPORT_TERMINATOR])
        .ok_or_else(malformed)?;
    let start = body.iter().rposition(|&b| b == b'[').ok_or_else(malformed)?;
    let fields = &body[start + 1..];
    let split = fields.iter().position(|&b| b == b';').ok_or_else(malformed)?;

    let row = parse_field(&fields[..split]).ok_or_else(malformed)?;
    let column = parse_field(&fields[split + 1..]).ok_or_else(malformed)?;

    Ok(CursorPosition::new(column, row))
}

fn parse_field(field: &[u8]) -> Option<usize> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }

    // positions are 1-indexed
    std::str::from_utf8(field)
        .ok()?
        .parse()
        .ok()
        .filter(|&n| n > 0)
}
