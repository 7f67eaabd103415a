// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

mod channel;
mod input_mode;

pub use channel::ChannelResponseSource;
pub use input_mode::InputModeGuard;

/// Outcome of waiting for one byte from the terminal under test.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputEvent {
    Byte(u8),
    TimedOut,
    Closed,
}

/// The read half of the duplex stream shared with the terminal under test.
pub trait ResponseSource {
    /// Wait at most `timeout` for the next byte.
    fn next_byte(&mut self, timeout: Duration) -> InputEvent;

    /// Remove and return every byte that has already arrived.
    fn drain(&mut self) -> Vec<u8>;
}

impl<S: ResponseSource + ?Sized> ResponseSource for &mut S {
    fn next_byte(&mut self, timeout: Duration) -> InputEvent {
        (**self).next_byte(timeout)
    }

    fn drain(&mut self) -> Vec<u8> {
        (**self).drain()
    }
}
