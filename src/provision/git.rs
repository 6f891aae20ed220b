use std::path::Path;

use crate::model::config::GitConfig;
use crate::provision::{CommandRunner, StepStatus};

/// Outcome of the git step, plus the program later steps should invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitClient {
    pub status: StepStatus,
    pub program: Option<String>,
}

impl GitClient {
    fn found(status: StepStatus, program: String) -> Self {
        Self {
            status,
            program: Some(program),
        }
    }

    fn failed(reason: String) -> Self {
        Self {
            status: StepStatus::Failed(reason),
            program: None,
        }
    }
}

/// Look for a git client and install it silently when missing.
///
/// A fresh install does not reach this process's `PATH`, so after installing
/// the detect command is retried and then the configured install locations.
pub fn ensure_git(
    commands: &dyn CommandRunner,
    config: &GitConfig,
    install: &[String],
) -> GitClient {
    let Some(program) = config.detect.first().cloned() else {
        return GitClient::failed("no git detect command configured".to_string());
    };

    if matches!(commands.run(&config.detect), Ok(true)) {
        tracing::info!("git already installed");
        return GitClient::found(StepStatus::AlreadyPresent, program);
    }

    if install.is_empty() {
        return GitClient::failed("git not found and no install command configured".to_string());
    }

    tracing::info!("git not found, installing via {}", install[0]);
    match commands.run(install) {
        Ok(true) => {}
        Ok(false) => {
            return GitClient::failed(format!("{} exited unsuccessfully", install.join(" ")));
        }
        Err(err) => return GitClient::failed(format!("could not start {}: {err}", install[0])),
    }

    if matches!(commands.run(&config.detect), Ok(true)) {
        return GitClient::found(StepStatus::Done, program);
    }

    match config
        .install_locations
        .iter()
        .find(|location| Path::new(location).is_file())
    {
        Some(location) => {
            tracing::info!("git installed at {location}");
            GitClient::found(StepStatus::Done, location.clone())
        }
        None => GitClient::failed(format!(
            "git installed but {program} is not on PATH yet; open a new shell and rerun"
        )),
    }
}
