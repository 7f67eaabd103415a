// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rand::Rng;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const WHITESPACE: &[u8] = b" \t\n\r\x0b\x0c";

const PRINTABLE: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n\r\x0b\x0c";

#[allow(clippy::cast_possible_truncation)]
const EXTENDED: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = i as u8;
        i += 1;
    }
    table
};

/// Character classes random lines are drawn from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Alphabet {
    /// `a`-`z`
    Lowercase,
    /// `a`-`z` and `A`-`Z`
    Letters,
    /// space, tab, line feed, carriage return, vertical tab, form feed
    Whitespace,
    /// digits, letters, punctuation and whitespace
    Printable,
    /// every byte value 0-255
    Extended,
}

impl Alphabet {
    #[must_use]
    pub const fn symbols(self) -> &'static [u8] {
        match self {
            Self::Lowercase => LOWERCASE,
            Self::Letters => LETTERS,
            Self::Whitespace => WHITESPACE,
            Self::Printable => PRINTABLE,
            Self::Extended => &EXTENDED,
        }
    }

    /// Whether a line drawn from this alphabet can move the cursor other than
    /// one column per byte.
    #[must_use]
    pub const fn is_ambiguous(self) -> bool {
        !matches!(self, Self::Lowercase | Self::Letters)
    }

    /// One symbol, uniformly.
    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> u8 {
        let symbols = self.symbols();
        symbols[rng.random_range(0..symbols.len())]
    }

    /// `len` symbols, drawn independently.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.pick(rng)).collect()
    }
}

/// True for bytes that always advance the cursor by exactly one column.
#[must_use]
pub const fn is_plain_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7e)
}
