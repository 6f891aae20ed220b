use std::io;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

use crate::model::config::LaunchConfig;
use crate::model::payload::Payload;
use crate::platform::stage_payload;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("could not stage payload: {0}")]
    Stage(#[source] io::Error),

    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("payload exited with status {code:?}")]
    Failed { code: Option<i32> },
}

/// The one place externally sourced script text is executed.
pub trait ScriptRunner {
    fn execute(&self, payload: &Payload) -> Result<(), ExecError>;
}

/// Runs the payload under the configured interpreter and waits for it.
pub struct InterpreterRunner {
    config: LaunchConfig,
    staging_dir: PathBuf,
}

impl InterpreterRunner {
    pub fn new(config: LaunchConfig, staging_dir: PathBuf) -> Self {
        Self {
            config,
            staging_dir,
        }
    }
}

impl ScriptRunner for InterpreterRunner {
    fn execute(&self, payload: &Payload) -> Result<(), ExecError> {
        let staged = stage_payload(&self.staging_dir, payload).map_err(ExecError::Stage)?;

        tracing::info!("executing payload with {}", self.config.interpreter);
        let status = Command::new(&self.config.interpreter)
            .args(&self.config.interpreter_args)
            .arg("-File")
            .arg(&*staged)
            .status()
            .map_err(|source| ExecError::Spawn {
                program: self.config.interpreter.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ExecError::Failed {
                code: status.code(),
            });
        }

        Ok(())
    }
}
