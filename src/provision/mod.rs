pub mod git;
pub mod wallpapers;

use crate::model::config::AppConfig;

pub use crate::platform::command::{CommandRunner, SystemCommands};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    AlreadyPresent,
    Done,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub git: StepStatus,
    pub wallpapers: StepStatus,
}

impl ProvisionReport {
    pub fn skipped() -> Self {
        Self {
            git: StepStatus::Skipped,
            wallpapers: StepStatus::Skipped,
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let StepStatus::Failed(err) = &self.git {
            let note = match self.wallpapers {
                StepStatus::Skipped => " (wallpaper clone skipped)",
                _ => "",
            };
            warnings.push(format!("git: {err}{note}"));
        }
        if let StepStatus::Failed(err) = &self.wallpapers {
            warnings.push(format!("wallpapers: {err}"));
        }
        warnings
    }
}

/// Idempotent follow-up steps: git client, then the wallpaper clone.
pub fn provision(config: &AppConfig, commands: &dyn CommandRunner) -> ProvisionReport {
    if !config.provision.enabled {
        tracing::info!("provisioning disabled");
        return ProvisionReport::skipped();
    }

    let client = git::ensure_git(commands, &config.provision.git, config.git_install_command());

    let wallpapers = match &client.program {
        Some(program) => wallpapers::sync(
            commands,
            program,
            &config.provision.wallpapers,
            &config.wallpaper_parent(),
        ),
        None => StepStatus::Skipped,
    };

    ProvisionReport {
        git: client.status,
        wallpapers,
    }
}
