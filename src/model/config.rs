use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub release: ReleaseConfig,
    pub http: HttpConfig,
    pub preset: PresetConfig,
    pub launch: LaunchTable,
    pub provision: ProvisionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseConfig {
    /// `owner/name` of the hosted project.
    pub project: String,
    pub api_base: String,
    pub web_base: String,
    pub payload_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresetConfig {
    pub file_name: String,
    pub flag: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchTable {
    pub windows: LaunchConfig,
    pub unix: LaunchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
    /// Terminal host wrapped around the interpreter when it is on `PATH`.
    #[serde(default)]
    pub preferred_host: Option<String>,
    pub interpreter: String,
    #[serde(default)]
    pub interpreter_args: Vec<String>,
    /// Program placed in front of the host to request privilege (Unix only).
    #[serde(default)]
    pub elevator: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionConfig {
    pub enabled: bool,
    pub git: GitConfig,
    pub wallpapers: WallpaperConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitConfig {
    pub detect: Vec<String>,
    pub install_windows: Vec<String>,
    pub install_unix: Vec<String>,
    /// Where the installers put `git` when the current `PATH` does not see it yet.
    #[serde(default)]
    pub install_locations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WallpaperConfig {
    pub repo: String,
    pub parent_dir: String,
    #[serde(default)]
    pub dest_name: Option<String>,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let user_path = directories::ProjectDirs::from("", "", "winstrap")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        Self::load_from(user_path.as_deref())
    }

    pub fn load_from(user_path: Option<&Path>) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(DEFAULTS).context("invalid built-in defaults")?;

        if let Some(path) = user_path.filter(|path| path.exists()) {
            let user_str = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let user_table: toml::Table = toml::from_str(&user_str)
                .with_context(|| format!("invalid config {}", path.display()))?;
            merge_tables(&mut table, user_table);
            tracing::info!("loaded user config from {}", path.display());
        }

        let mut config = toml::Value::Table(table)
            .try_into::<AppConfig>()
            .context("config does not match the expected layout")?;

        if config.provision.wallpapers.parent_dir.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.provision.wallpapers.parent_dir = config
                .provision
                .wallpapers
                .parent_dir
                .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    /// Launch settings for the platform this binary was built for.
    pub fn launch(&self) -> &LaunchConfig {
        if cfg!(windows) {
            &self.launch.windows
        } else {
            &self.launch.unix
        }
    }

    pub fn git_install_command(&self) -> &[String] {
        if cfg!(windows) {
            &self.provision.git.install_windows
        } else {
            &self.provision.git.install_unix
        }
    }

    /// Preset artifact location: explicit override, else next to the running executable.
    pub fn preset_path(&self) -> PathBuf {
        if let Some(path) = self.preset.path.as_ref() {
            return path.clone();
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&self.preset.file_name)
    }

    pub fn wallpaper_parent(&self) -> PathBuf {
        PathBuf::from(&self.provision.wallpapers.parent_dir)
    }
}

impl ReleaseConfig {
    pub fn index_url(&self) -> String {
        format!(
            "{}/repos/{}/releases",
            self.api_base.trim_end_matches('/'),
            self.project
        )
    }

    pub fn releases_base(&self) -> String {
        format!("{}/{}/releases", self.web_base.trim_end_matches('/'), self.project)
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Overlay `overlay` onto `base`, recursing into nested tables so single keys can be overridden.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_user_file() {
        let config = AppConfig::load_from(None).unwrap();

        assert_eq!(config.release.payload_name, "winutil.ps1");
        assert_eq!(config.preset.flag, "-CustomPreset");
        assert!(config.provision.enabled);
        assert!(!config.provision.wallpapers.parent_dir.starts_with('~'));
    }

    #[test]
    fn user_file_overrides_single_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[release]\nproject = \"acme/tool\"\n\n[http]\nread_timeout_secs = 5\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Some(&path)).unwrap();

        assert_eq!(config.release.project, "acme/tool");
        assert_eq!(config.release.payload_name, "winutil.ps1");
        assert_eq!(config.http.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn invalid_user_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[release\nproject = ").unwrap();

        assert!(AppConfig::load_from(Some(&path)).is_err());
    }

    #[test]
    fn missing_user_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();

        assert_eq!(config.release.project, "ChrisTitusTech/winutil");
    }

    #[test]
    fn derives_release_urls() {
        let config = AppConfig::load_from(None).unwrap();

        assert_eq!(
            config.release.index_url(),
            "https://api.github.com/repos/ChrisTitusTech/winutil/releases"
        );
        assert_eq!(
            config.release.releases_base(),
            "https://github.com/ChrisTitusTech/winutil/releases"
        );
    }

    #[test]
    fn explicit_preset_path_wins() {
        let mut config = AppConfig::load_from(None).unwrap();
        config.preset.path = Some(PathBuf::from("/cfg/preset.json"));

        assert_eq!(config.preset_path(), PathBuf::from("/cfg/preset.json"));
    }

    #[test]
    fn default_preset_path_uses_file_name() {
        let config = AppConfig::load_from(None).unwrap();

        assert!(config.preset_path().ends_with("preset.json"));
    }
}
