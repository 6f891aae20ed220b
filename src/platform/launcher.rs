use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::config::LaunchConfig;
use crate::model::payload::Payload;
use crate::platform::command::CommandRunner;
use crate::platform::{
    HostPlatform, STALE_PAYLOAD_AGE, find_on_path, stage_payload, sweep_stale_payloads,
};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("could not stage payload: {0}")]
    Stage(#[source] io::Error),

    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("elevation request was declined by {program}")]
    Denied { program: String },

    #[error("no elevator configured for this platform")]
    NoElevator,
}

/// Shell or terminal the elevated payload runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellHost {
    /// Preferred terminal host, wrapping the interpreter.
    Terminal(String),
    /// The interpreter on its own.
    Baseline(String),
}

impl ShellHost {
    pub fn program(&self) -> &str {
        match self {
            ShellHost::Terminal(program) | ShellHost::Baseline(program) => program,
        }
    }
}

/// Commands that request the elevated start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Waited on; returns once the user has answered the consent prompt.
    /// A non-zero exit means consent was refused.
    pub consent: Vec<String>,
    /// Started after consent and never awaited.
    pub detach: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReceipt {
    pub host: ShellHost,
    pub script: PathBuf,
}

/// Starts the payload in a new elevated process without waiting for it.
pub trait Launch {
    fn relaunch_elevated(&self, payload: &Payload) -> Result<LaunchReceipt, LaunchError>;
}

pub fn select_host(config: &LaunchConfig, on_path: impl Fn(&str) -> bool) -> ShellHost {
    match config.preferred_host.as_deref() {
        Some(host) if !host.is_empty() && on_path(host) => ShellHost::Terminal(host.to_string()),
        _ => ShellHost::Baseline(config.interpreter.clone()),
    }
}

pub fn elevated_plan(
    platform: HostPlatform,
    config: &LaunchConfig,
    host: &ShellHost,
    script: &Path,
) -> Result<LaunchPlan, LaunchError> {
    let mut host_args: Vec<String> = Vec::new();
    if let ShellHost::Terminal(_) = host {
        host_args.push(config.interpreter.clone());
    }
    host_args.extend(config.interpreter_args.iter().cloned());
    host_args.push("-File".to_string());

    match platform {
        HostPlatform::Windows => {
            host_args.push(format!("\"{}\"", script.display()));
            let start = format!(
                "Start-Process -FilePath {} -ArgumentList {} -Verb RunAs",
                ps_quote(host.program()),
                ps_quote(&host_args.join(" "))
            );
            // Start-Process returns once the UAC prompt is answered; the elevated
            // host it starts is already detached from us.
            Ok(LaunchPlan {
                consent: vec![
                    config.interpreter.clone(),
                    "-NoProfile".to_string(),
                    "-Command".to_string(),
                    start,
                ],
                detach: None,
            })
        }
        HostPlatform::Unix => {
            let elevator = config
                .elevator
                .as_deref()
                .filter(|elevator| !elevator.is_empty())
                .ok_or(LaunchError::NoElevator)?;
            host_args.push(script.display().to_string());

            // Ask for the password in the foreground, then start without a prompt
            // so the detached child never reads from the terminal.
            let mut detach = vec![
                elevator.to_string(),
                "-n".to_string(),
                host.program().to_string(),
            ];
            detach.extend(host_args);
            Ok(LaunchPlan {
                consent: vec![elevator.to_string(), "-v".to_string()],
                detach: Some(detach),
            })
        }
    }
}

/// Single-quoted PowerShell literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub struct SystemLauncher {
    config: LaunchConfig,
    staging_dir: PathBuf,
    platform: HostPlatform,
    commands: Box<dyn CommandRunner>,
}

impl SystemLauncher {
    pub fn new(
        config: LaunchConfig,
        staging_dir: PathBuf,
        commands: Box<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            staging_dir,
            platform: HostPlatform::current(),
            commands,
        }
    }

    fn start(&self, plan: &LaunchPlan) -> Result<(), LaunchError> {
        let program = plan.consent.first().cloned().unwrap_or_default();

        match self.commands.run(&plan.consent) {
            Ok(true) => {}
            Ok(false) => return Err(LaunchError::Denied { program }),
            Err(source) => return Err(LaunchError::Spawn { program, source }),
        }

        if let Some(detach) = &plan.detach {
            self.commands
                .spawn(detach)
                .map_err(|source| LaunchError::Spawn {
                    program: detach.first().cloned().unwrap_or_default(),
                    source,
                })?;
        }

        Ok(())
    }
}

impl Launch for SystemLauncher {
    fn relaunch_elevated(&self, payload: &Payload) -> Result<LaunchReceipt, LaunchError> {
        let host = select_host(&self.config, |program| find_on_path(program).is_some());

        let swept = sweep_stale_payloads(&self.staging_dir, STALE_PAYLOAD_AGE);
        if swept > 0 {
            tracing::info!("removed {swept} stale staged payloads");
        }

        let staged = stage_payload(&self.staging_dir, payload).map_err(LaunchError::Stage)?;
        // The detached child reads the script after we exit.
        let script = staged.keep().map_err(|err| LaunchError::Stage(err.error))?;

        let started = elevated_plan(self.platform, &self.config, &host, &script)
            .and_then(|plan| self.start(&plan));
        if let Err(err) = started {
            let _ = fs::remove_file(&script);
            return Err(err);
        }

        tracing::info!(
            "elevated relaunch requested via {} ({})",
            host.program(),
            script.display()
        );
        Ok(LaunchReceipt { host, script })
    }
}
