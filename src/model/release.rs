use serde::Deserialize;

/// One published release as reported by the hosting platform's index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name", alias = "tag")]
    pub tag: String,
    #[serde(rename = "prerelease")]
    pub is_prerelease: bool,
}

impl Release {
    #[cfg(test)]
    pub fn new(tag: impl Into<String>, is_prerelease: bool) -> Self {
        Self {
            tag: tag.into(),
            is_prerelease,
        }
    }
}

/// Releases in the order the index reported them (typically newest first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ReleaseIndex(pub Vec<Release>);

impl ReleaseIndex {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// First pre-release, else first stable release, else nothing.
    pub fn select(&self) -> Option<&Release> {
        self.0
            .iter()
            .find(|release| release.is_prerelease)
            .or_else(|| self.0.iter().find(|release| !release.is_prerelease))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorSource {
    Release { tag: String },
    Fallback,
}

/// Download URL for the payload. Never empty: the fallback alias always exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocator {
    pub url: String,
    pub source: LocatorSource,
}

impl ResolvedLocator {
    pub fn for_release(releases_base: &str, payload_name: &str, release: &Release) -> Self {
        Self {
            url: format!(
                "{}/download/{}/{payload_name}",
                releases_base.trim_end_matches('/'),
                release.tag
            ),
            source: LocatorSource::Release {
                tag: release.tag.clone(),
            },
        }
    }

    pub fn fallback(releases_base: &str, payload_name: &str) -> Self {
        Self {
            url: format!(
                "{}/latest/download/{payload_name}",
                releases_base.trim_end_matches('/')
            ),
            source: LocatorSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, LocatorSource::Fallback)
    }
}
