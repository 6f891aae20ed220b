use std::path::PathBuf;

use crate::error::BootstrapError;
use crate::model::config::AppConfig;
use crate::model::release::{LocatorSource, ResolvedLocator};
use crate::platform::default_staging_dir;
use crate::platform::http::{Fetch, HttpFetcher};
use crate::platform::launcher::{Launch, SystemLauncher};
use crate::platform::privilege::{PrivilegeCheck, SystemPrivilege};
use crate::platform::runner::{InterpreterRunner, ScriptRunner};
use crate::provision::{self, CommandRunner, ProvisionReport, SystemCommands};
use crate::resolver::ReleaseResolver;
use crate::sequencer::{BootstrapSequencer, ExitSignal};

/// Result of a complete run, for the summary printed by `main`.
#[derive(Debug)]
pub struct Outcome {
    pub locator: ResolvedLocator,
    pub signal: ExitSignal,
    pub provision: ProvisionReport,
}

pub struct App {
    pub config: AppConfig,
    fetcher: Box<dyn Fetch>,
    privilege: Box<dyn PrivilegeCheck>,
    launcher: Box<dyn Launch>,
    runner: Box<dyn ScriptRunner>,
    commands: Box<dyn CommandRunner>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let staging_dir = default_staging_dir();
        let launch = config.launch().clone();

        Self {
            fetcher: Box::new(HttpFetcher::new(&config.http)),
            privilege: Box::new(SystemPrivilege),
            launcher: Box::new(SystemLauncher::new(
                launch.clone(),
                staging_dir.clone(),
                Box::new(SystemCommands { quiet: false }),
            )),
            runner: Box::new(InterpreterRunner::new(launch, staging_dir)),
            commands: Box::new(SystemCommands { quiet: true }),
            config,
        }
    }

    pub fn preset_path(&self) -> PathBuf {
        self.config.preset_path()
    }

    pub fn run(&self) -> Result<Outcome, BootstrapError> {
        let resolver = ReleaseResolver::new(self.fetcher.as_ref(), &self.config.release);
        let locator = resolver.resolve();
        match &locator.source {
            LocatorSource::Release { tag } => println!("using release {tag}"),
            LocatorSource::Fallback => println!("release index unavailable, using latest release"),
        }

        let sequencer = BootstrapSequencer::new(
            self.fetcher.as_ref(),
            self.privilege.as_ref(),
            self.launcher.as_ref(),
            self.runner.as_ref(),
            self.config.preset.flag.as_str(),
        );
        let signal = sequencer.run(&locator, &self.preset_path())?;

        let provision = provision::provision(&self.config, self.commands.as_ref());
        for warning in provision.warnings() {
            tracing::warn!("provisioning: {warning}");
        }

        Ok(Outcome {
            locator,
            signal,
            provision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payload::Payload;
    use crate::platform::http::FetchError;
    use crate::platform::launcher::{LaunchError, LaunchReceipt, ShellHost};
    use crate::platform::runner::ExecError;
    use std::io;

    struct RoutedFetch;

    impl Fetch for RoutedFetch {
        fn get_text(&self, url: &str) -> Result<String, FetchError> {
            if url.ends_with("/releases") {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    code: 403,
                });
            }
            Ok("Write-Host hi".to_string())
        }
    }

    struct NotElevated;

    impl PrivilegeCheck for NotElevated {
        fn is_elevated(&self) -> bool {
            false
        }
    }

    struct AcceptingLauncher;

    impl Launch for AcceptingLauncher {
        fn relaunch_elevated(&self, _payload: &Payload) -> Result<LaunchReceipt, LaunchError> {
            Ok(LaunchReceipt {
                host: ShellHost::Terminal("wt.exe".to_string()),
                script: PathBuf::from("payload.ps1"),
            })
        }
    }

    struct UnusedRunner;

    impl ScriptRunner for UnusedRunner {
        fn execute(&self, _payload: &Payload) -> Result<(), ExecError> {
            Err(ExecError::Failed { code: None })
        }
    }

    struct AlwaysOk;

    impl CommandRunner for AlwaysOk {
        fn run(&self, _argv: &[String]) -> io::Result<bool> {
            Ok(true)
        }

        fn spawn(&self, _argv: &[String]) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn index_failure_falls_back_and_relaunches() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::load_from(None).unwrap();
        config.preset.path = Some(dir.path().join("preset.json"));
        config.provision.wallpapers.parent_dir = dir.path().to_string_lossy().into_owned();

        let app = App {
            config,
            fetcher: Box::new(RoutedFetch),
            privilege: Box::new(NotElevated),
            launcher: Box::new(AcceptingLauncher),
            runner: Box::new(UnusedRunner),
            commands: Box::new(AlwaysOk),
        };

        let outcome = app.run().unwrap();

        assert!(outcome.locator.is_fallback());
        assert!(matches!(outcome.signal, ExitSignal::Relaunched(_)));
        assert!(outcome.provision.warnings().is_empty());
    }
}
