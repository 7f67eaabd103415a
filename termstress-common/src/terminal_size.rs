// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::num::ParseIntError;

use thiserror::Error;

pub const DEFAULT_WIDTH: usize = 80;

/// Widest terminal accepted; cursor reports cannot address more columns.
pub const MAX_WIDTH: usize = u16::MAX as usize;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum WidthError {
    #[error("no terminal width given")]
    Missing,
    #[error("invalid terminal width {value:?}: {source}")]
    Invalid {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("terminal width must be at least 1")]
    Zero,
    #[error("terminal width {0} exceeds {max} columns", max = MAX_WIDTH)]
    TooWide(usize),
}

/// Column count of the terminal under test, fixed for the whole run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TerminalWidth {
    columns: usize,
    assumed: bool,
}

impl Default for TerminalWidth {
    fn default() -> Self {
        Self::assumed()
    }
}

impl TerminalWidth {
    /// # Errors
    /// Will return an error if `columns` is zero or above [`MAX_WIDTH`]
    pub const fn new(columns: usize) -> Result<Self, WidthError> {
        if columns == 0 {
            return Err(WidthError::Zero);
        }
        if columns > MAX_WIDTH {
            return Err(WidthError::TooWide(columns));
        }

        Ok(Self {
            columns,
            assumed: false,
        })
    }

    #[must_use]
    pub const fn assumed() -> Self {
        Self {
            columns: DEFAULT_WIDTH,
            assumed: true,
        }
    }

    /// Parse the positional width argument.
    ///
    /// # Errors
    /// Will return an error if the argument is absent, not a number, zero or too wide
    pub fn parse(arg: Option<&str>) -> Result<Self, WidthError> {
        let value = arg.ok_or(WidthError::Missing)?;
        let columns = value
            .trim()
            .parse::<usize>()
            .map_err(|source| WidthError::Invalid {
                value: value.to_string(),
                source,
            })?;

        Self::new(columns)
    }

    /// Like [`Self::parse`], but falls back to [`DEFAULT_WIDTH`] on failure.
    #[must_use]
    pub fn parse_or_default(arg: Option<&str>) -> Self {
        Self::parse(arg).unwrap_or_else(|e| {
            warn!("{e}, assuming {DEFAULT_WIDTH} columns");
            Self::assumed()
        })
    }

    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// True when the width was not supplied and the default is in use.
    #[must_use]
    pub const fn is_assumed(&self) -> bool {
        self.assumed
    }

    /// Number of screen rows a line of `cells` printed cells occupies.
    ///
    /// An empty line still occupies the row the cursor is on.
    #[must_use]
    pub const fn rows_for(&self, cells: usize) -> usize {
        if cells == 0 {
            1
        } else {
            cells.div_ceil(self.columns)
        }
    }
}
