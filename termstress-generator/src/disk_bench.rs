// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::ffi::OsString;
use std::process::ExitStatus;

use termstress_common::config::DiskConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiskBenchError {
    #[error("Failed to run {program:?}: {source}")]
    Spawn {
        program: OsString,
        #[source]
        source: std::io::Error,
    },
    #[error("Disk benchmark exited with {0}")]
    Failed(ExitStatus),
}

/// `hdparm -tT <device>`, optionally through `sudo`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiskBenchCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl From<&DiskConfig> for DiskBenchCommand {
    fn from(config: &DiskConfig) -> Self {
        let mut argv: Vec<OsString> = Vec::with_capacity(4);
        if config.use_sudo {
            argv.push("sudo".into());
        }
        argv.push("hdparm".into());
        argv.push("-tT".into());
        argv.push(config.device.clone().into_os_string());

        let program = argv.remove(0);
        Self {
            program,
            args: argv,
        }
    }
}

impl DiskBenchCommand {
    /// Run the benchmark with inherited stdio. Only the exit status is looked
    /// at.
    ///
    /// # Errors
    /// Will return an error if the command cannot be started or exits
    /// unsuccessfully
    pub fn run(&self) -> Result<(), DiskBenchError> {
        info!("Running disk benchmark: {:?} {:?}", self.program, self.args);

        let output = duct::cmd(self.program.clone(), &self.args)
            .unchecked()
            .run()
            .map_err(|source| DiskBenchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            debug!("Disk benchmark finished");
            Ok(())
        } else {
            Err(DiskBenchError::Failed(output.status))
        }
    }
}
