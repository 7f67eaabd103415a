// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

/// A cursor position as reported by the terminal under test.
///
/// Both fields are 1-indexed. The terminal reports `ESC [ row ; col R`, so the
/// first number on the wire is the row even though positions are displayed
/// column first.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct CursorPosition {
    pub column: usize,
    pub row: usize,
}

impl CursorPosition {
    #[must_use]
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Position `rows` lines below this one, optionally pinned to the last
    /// screen row (the terminal scrolls instead of moving the cursor).
    #[must_use]
    pub fn advanced_by(self, rows: usize, screen_rows: Option<usize>) -> Self {
        let row = self.row.saturating_add(rows);
        let row = screen_rows.map_or(row, |limit| row.min(limit));

        Self {
            column: self.column,
            row,
        }
    }
}

impl fmt::Display for CursorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}
