// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#[cfg(unix)]
use nix::sys::termios::{LocalFlags, SetArg, Termios, tcgetattr, tcsetattr};
use std::io::IsTerminal;
#[cfg(unix)]
use std::os::fd::AsFd;

/// Turns off canonical mode and echo on a terminal stdin for as long as it is
/// alive, so cursor reports arrive without a trailing newline and are not
/// echoed into the stream under test. Output processing is left untouched.
///
/// When stdin is not a terminal (a pipe from a PTY harness, a test) nothing is
/// changed.
#[derive(Debug)]
pub struct InputModeGuard {
    #[cfg(unix)]
    saved: Option<Termios>,
}

impl InputModeGuard {
    /// # Errors
    /// Will return an error if the terminal attributes cannot be read or set
    #[cfg(unix)]
    pub fn enable() -> Result<Self, nix::Error> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            debug!("stdin is not a terminal, leaving input mode alone");
            return Ok(Self { saved: None });
        }

        let saved = tcgetattr(stdin.as_fd())?;
        let mut term = saved.clone();
        term.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
        tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &term)?;
        debug!("Disabled canonical mode and echo on stdin");

        Ok(Self { saved: Some(saved) })
    }

    /// # Errors
    /// Never fails on this platform
    #[cfg(not(unix))]
    pub fn enable() -> Result<Self, std::io::Error> {
        if std::io::stdin().is_terminal() {
            warn!("Cannot change terminal input mode on this platform");
        }
        Ok(Self {})
    }

    /// True when terminal attributes were changed and will be restored on drop.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        #[cfg(unix)]
        {
            self.saved.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }
}

#[cfg(unix)]
impl Drop for InputModeGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take()
            && let Err(e) = tcsetattr(std::io::stdin().as_fd(), SetArg::TCSANOW, &saved)
        {
            error!("Failed to restore terminal input mode: {e}");
        }
    }
}
