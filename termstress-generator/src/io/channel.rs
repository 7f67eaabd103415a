// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::{InputEvent, ResponseSource};

/// Response source fed by a background thread that pumps a blocking reader
/// into a channel, so queries can wait with a deadline.
///
/// The pump thread never writes; request/response ordering is owned by the
/// caller of [`crate::cpr::query_cursor`].
#[derive(Debug)]
pub struct ChannelResponseSource {
    rx: Receiver<u8>,
}

impl ChannelResponseSource {
    /// Start pumping `reader` on a named background thread.
    ///
    /// # Errors
    /// Will return an error if the thread cannot be spawned
    pub fn spawn<R: Read + Send + 'static>(reader: R) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();

        std::thread::Builder::new()
            .name("termstress-input".to_string())
            .spawn(move || pump(reader, &tx))?;

        Ok(Self { rx })
    }

    /// Pump the process's standard input.
    ///
    /// # Errors
    /// Will return an error if the thread cannot be spawned
    pub fn stdin() -> std::io::Result<Self> {
        Self::spawn(std::io::stdin())
    }
}

fn pump<R: Read>(mut reader: R, tx: &Sender<u8>) {
    let mut buf = [0u8; 64];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("Input reached end of stream");
                return;
            }
            Ok(n) => {
                for &byte in &buf[..n] {
                    if tx.send(byte).is_err() {
                        // receiver dropped, nobody is listening anymore
                        return;
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                error!("Failed to read input: {e}");
                return;
            }
        }
    }
}

impl ResponseSource for ChannelResponseSource {
    fn next_byte(&mut self, timeout: Duration) -> InputEvent {
        match self.rx.recv_timeout(timeout) {
            Ok(byte) => InputEvent::Byte(byte),
            Err(RecvTimeoutError::Timeout) => InputEvent::TimedOut,
            Err(RecvTimeoutError::Disconnected) => InputEvent::Closed,
        }
    }

    fn drain(&mut self) -> Vec<u8> {
        self.rx.try_iter().collect()
    }
}
