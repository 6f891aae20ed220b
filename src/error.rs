use thiserror::Error;

use crate::platform::http::FetchError;
use crate::platform::launcher::LaunchError;
use crate::platform::runner::ExecError;

/// Failure kinds surfaced by the bootstrap run.
///
/// `IndexUnavailable` is recoverable: the caller degrades to the fallback
/// locator. Every other kind aborts the run with a non-zero exit.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("release index unavailable: {0}")]
    IndexUnavailable(#[source] IndexError),

    #[error("payload unavailable: {0}")]
    PayloadUnavailable(#[source] FetchError),

    #[error("elevated relaunch was not started: {0}")]
    ElevationDenied(#[source] LaunchError),

    #[error("payload execution failed: {0}")]
    UntrustedPayloadFailure(#[source] ExecError),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed release index: {0}")]
    Parse(#[from] serde_json::Error),
}
