pub mod command;
pub mod http;
pub mod launcher;
pub mod privilege;
pub mod runner;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempPath;

use crate::model::payload::Payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Unix,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Unix
        }
    }
}

/// Where payload scripts are written before an interpreter reads them.
pub fn default_staging_dir() -> PathBuf {
    if let Some(project_dirs) = directories::ProjectDirs::from("", "", "winstrap") {
        return project_dirs.cache_dir().join("staging");
    }

    std::env::temp_dir().join("winstrap-staging")
}

/// Write the payload text to a fresh `.ps1` file under `dir`.
///
/// The file carries a UTF-8 byte order mark so Windows PowerShell does not
/// read it in the ANSI code page. It is deleted when the returned path drops.
pub fn stage_payload(dir: &Path, payload: &Payload) -> io::Result<TempPath> {
    fs::create_dir_all(dir)?;

    let mut file = tempfile::Builder::new()
        .prefix("payload-")
        .suffix(".ps1")
        .tempfile_in(dir)?;
    file.write_all("\u{feff}".as_bytes())?;
    file.write_all(payload.text().as_bytes())?;
    file.flush()?;

    Ok(file.into_temp_path())
}

/// Staged payloads older than this are removed before staging a new one.
pub const STALE_PAYLOAD_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Remove `payload-*.ps1` files under `dir` last modified more than `max_age` ago.
///
/// Kept files belong to detached elevated children, so only old ones go.
pub fn sweep_stale_payloads(dir: &Path, max_age: Duration) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    let now = SystemTime::now();

    entries
        .flatten()
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with("payload-") && name.ends_with(".ps1")
        })
        .filter(|entry| {
            entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age)
        })
        .filter(|entry| match fs::remove_file(entry.path()) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("could not remove {}: {err}", entry.path().display());
                false
            }
        })
        .count()
}

/// Locate `program` on `PATH`, trying `.exe` on Windows when no extension is given.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let direct = dir.join(program);
        if direct.is_file() {
            return Some(direct);
        }

        if cfg!(windows) && candidate.extension().is_none() {
            let with_exe = dir.join(format!("{program}.exe"));
            if with_exe.is_file() {
                return Some(with_exe);
            }
        }

        None
    })
}
