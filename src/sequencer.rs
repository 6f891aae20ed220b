use std::path::Path;

use crate::error::BootstrapError;
use crate::model::payload::Payload;
use crate::model::release::ResolvedLocator;
use crate::model::stage::Stage;
use crate::platform::http::Fetch;
use crate::platform::launcher::{Launch, LaunchReceipt};
use crate::platform::privilege::{PrivilegeCheck, needs_elevation};
use crate::platform::runner::ScriptRunner;

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitSignal {
    /// A new elevated process was requested; this process does not wait for it.
    Relaunched(LaunchReceipt),
    /// The payload ran here and exited cleanly.
    Executed,
}

/// Fetch → augment → elevate-check → relaunch or execute.
pub struct BootstrapSequencer<'a> {
    fetcher: &'a dyn Fetch,
    privilege: &'a dyn PrivilegeCheck,
    launcher: &'a dyn Launch,
    runner: &'a dyn ScriptRunner,
    preset_flag: String,
}

impl<'a> BootstrapSequencer<'a> {
    pub fn new(
        fetcher: &'a dyn Fetch,
        privilege: &'a dyn PrivilegeCheck,
        launcher: &'a dyn Launch,
        runner: &'a dyn ScriptRunner,
        preset_flag: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            privilege,
            launcher,
            runner,
            preset_flag: preset_flag.into(),
        }
    }

    pub fn run(
        &self,
        locator: &ResolvedLocator,
        preset_path: &Path,
    ) -> Result<ExitSignal, BootstrapError> {
        enter(Stage::Fetch);
        let mut payload = self.fetch_payload(locator)?;

        enter(Stage::Augment);
        self.augment_with_preset(&mut payload, preset_path);

        enter(Stage::ElevateCheck);
        if needs_elevation(self.privilege) {
            enter(Stage::ElevatedRelaunch);
            let receipt = self
                .launcher
                .relaunch_elevated(&payload)
                .map_err(BootstrapError::ElevationDenied)?;
            return Ok(ExitSignal::Relaunched(receipt));
        }

        enter(Stage::InlineExecute);
        self.runner
            .execute(&payload)
            .map_err(BootstrapError::UntrustedPayloadFailure)?;
        Ok(ExitSignal::Executed)
    }

    pub fn fetch_payload(&self, locator: &ResolvedLocator) -> Result<Payload, BootstrapError> {
        let script = self
            .fetcher
            .get_text(&locator.url)
            .map_err(BootstrapError::PayloadUnavailable)?;
        tracing::info!("fetched payload ({} bytes) from {}", script.len(), locator.url);
        Ok(Payload::from_script(&script))
    }

    pub fn augment_with_preset(&self, payload: &mut Payload, preset_path: &Path) {
        if payload.augment_with_preset(&self.preset_flag, preset_path) {
            tracing::info!("preset found, passing {}", preset_path.display());
        } else {
            tracing::debug!("no preset at {}", preset_path.display());
        }
    }
}

fn enter(stage: Stage) {
    tracing::info!(stage = stage.label(), "entering stage");
}
