// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Replays the debug log written by the PTY harness.
//!
//! Each record is one line, `<seconds>: <c> (<decimal>)`. Lines written for
//! typed input carry an extra tag prefix (`stdin: ...`) and are skipped. The
//! payload is the single byte at a fixed offset.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use termstress_common::config::ReplayConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayDecodeError {
    #[error("Failed to read log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Record on line {line} has {len} bytes, no payload at offset {offset}: {:?}", .record.escape_ascii().to_string())]
    TruncatedRecord {
        line: usize,
        len: usize,
        offset: usize,
        record: Vec<u8>,
    },
    #[error("Failed to write replayed output: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReplayOptions {
    pub payload_offset: usize,
    pub input_tag: Vec<u8>,
    pub realtime: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self::from(&ReplayConfig::default())
    }
}

impl From<&ReplayConfig> for ReplayOptions {
    fn from(config: &ReplayConfig) -> Self {
        Self {
            payload_offset: config.payload_offset,
            input_tag: config.input_tag.clone().into_bytes(),
            realtime: config.realtime,
        }
    }
}

/// One decoded output byte.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ReplayRecord {
    /// 1-based line the record starts on.
    pub line: usize,
    /// Seconds since the harness started, when the prefix parses.
    pub at: Option<Duration>,
    pub byte: u8,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ReplayStats {
    pub replayed: usize,
    pub skipped: usize,
}

/// Lazily decodes records, stopping at the first malformed one.
#[derive(Debug)]
pub struct Records<'a> {
    lines: std::iter::Enumerate<std::slice::Split<'a, u8, fn(&u8) -> bool>>,
    options: &'a ReplayOptions,
    skipped: usize,
    failed: bool,
}

impl<'a> Records<'a> {
    #[must_use]
    pub fn new(log: &'a [u8], options: &'a ReplayOptions) -> Self {
        let log = log.strip_suffix(b"\n").unwrap_or(log);

        Self {
            lines: log.split(is_newline as fn(&u8) -> bool).enumerate(),
            options,
            skipped: 0,
            failed: false,
        }
    }

    /// Lines skipped so far (typed input, blank lines, continuation fragments).
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Records<'_> {
    type Item = Result<ReplayRecord, ReplayDecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let (index, record) = self.lines.next()?;
            let line = index + 1;
            let offset = self.options.payload_offset;

            if record.is_empty()
                || record.starts_with(&self.options.input_tag)
                || is_continuation(record)
            {
                self.skipped += 1;
                continue;
            }

            let byte = match record.len() {
                // the payload was a newline, which ended the line early
                len if len == offset => b'\n',
                len if len < offset => {
                    self.failed = true;
                    return Some(Err(ReplayDecodeError::TruncatedRecord {
                        line,
                        len,
                        offset,
                        record: record.to_vec(),
                    }));
                }
                _ => record[offset],
            };

            return Some(Ok(ReplayRecord {
                line,
                at: timestamp(record),
                byte,
            }));
        }
    }
}

const fn is_newline(byte: &u8) -> bool {
    *byte == b'\n'
}

/// The ` (<decimal>)` tail left over when a record's payload was a newline.
fn is_continuation(record: &[u8]) -> bool {
    record
        .strip_prefix(b" (")
        .and_then(|rest| rest.strip_suffix(b")"))
        .is_some_and(|digits| {
            (1..=3).contains(&digits.len()) && digits.iter().all(u8::is_ascii_digit)
        })
}

fn timestamp(record: &[u8]) -> Option<Duration> {
    let end = record.iter().position(|&b| b == b':')?;
    let secs: f64 = std::str::from_utf8(&record[..end]).ok()?.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Decode every record of `log`.
///
/// # Errors
/// Will return an error at the first malformed record
pub fn decode_log(
    log: &[u8],
    options: &ReplayOptions,
) -> Result<Vec<ReplayRecord>, ReplayDecodeError> {
    Records::new(log, options).collect()
}

/// Write the payload of every record in `log` to `out`, flushing after each.
///
/// Bytes before a malformed record have already been written when the error
/// is returned.
///
/// # Errors
/// Will return an error at the first malformed record or failed write
pub fn replay<W: Write + ?Sized>(
    log: &[u8],
    out: &mut W,
    options: &ReplayOptions,
) -> Result<ReplayStats, ReplayDecodeError> {
    let mut records = Records::new(log, options);
    let mut previous: Option<Duration> = None;
    let mut replayed = 0;

    for record in records.by_ref() {
        let record = record?;

        if options.realtime
            && let Some(at) = record.at
        {
            if let Some(prev) = previous {
                let wait = at.saturating_sub(prev);
                if !wait.is_zero() {
                    std::thread::sleep(wait);
                }
            }
            previous = Some(at);
        }

        out.write_all(&[record.byte])?;
        out.flush()?;
        replayed += 1;
    }

    let stats = ReplayStats {
        replayed,
        skipped: records.skipped(),
    };
    debug!("Replayed {} bytes, skipped {} lines", stats.replayed, stats.skipped);
    Ok(stats)
}

/// Read `path` and [`replay`] it.
///
/// # Errors
/// Will return an error if the file cannot be read, at the first malformed
/// record, or on a failed write
pub fn replay_file<W: Write + ?Sized>(
    path: &Path,
    out: &mut W,
    options: &ReplayOptions,
) -> Result<ReplayStats, ReplayDecodeError> {
    let log = std::fs::read(path).map_err(|source| ReplayDecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Replaying {} ({} bytes)", path.display(), log.len());
    replay(&log, out, options)
}
