use crate::error::{BootstrapError, IndexError};
use crate::model::config::ReleaseConfig;
use crate::model::release::{ReleaseIndex, ResolvedLocator};
use crate::platform::http::Fetch;

/// Picks the release whose payload gets downloaded.
pub struct ReleaseResolver<'a> {
    fetcher: &'a dyn Fetch,
    index_url: String,
    releases_base: String,
    payload_name: String,
}

impl<'a> ReleaseResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetch, config: &ReleaseConfig) -> Self {
        Self {
            fetcher,
            index_url: config.index_url(),
            releases_base: config.releases_base(),
            payload_name: config.payload_name.clone(),
        }
    }

    /// Single attempt at the release index.
    pub fn fetch_index(&self) -> Result<ReleaseIndex, BootstrapError> {
        let raw = self
            .fetcher
            .get_text(&self.index_url)
            .map_err(|err| BootstrapError::IndexUnavailable(IndexError::from(err)))?;

        ReleaseIndex::parse(&raw).map_err(|err| BootstrapError::IndexUnavailable(err.into()))
    }

    /// Locator for the preferred release; the "latest" alias when the index is
    /// unreachable, malformed or empty.
    pub fn resolve(&self) -> ResolvedLocator {
        let index = match self.fetch_index() {
            Ok(index) => index,
            Err(err) => {
                tracing::warn!("{err}; using latest release alias");
                return self.fallback();
            }
        };

        if index.is_empty() {
            tracing::warn!("release index is empty; using latest release alias");
            return self.fallback();
        }
        let Some(release) = index.select() else {
            return self.fallback();
        };

        tracing::info!(
            "selected release {} (prerelease: {}) from {} entries",
            release.tag,
            release.is_prerelease,
            index.len()
        );
        ResolvedLocator::for_release(&self.releases_base, &self.payload_name, release)
    }

    pub fn fallback(&self) -> ResolvedLocator {
        ResolvedLocator::fallback(&self.releases_base, &self.payload_name)
    }
}
