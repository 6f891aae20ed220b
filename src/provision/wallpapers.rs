use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::WallpaperConfig;
use crate::provision::{CommandRunner, StepStatus};

/// Clone the wallpaper repository under `parent` with `git`, unless it is already there.
pub fn sync(
    commands: &dyn CommandRunner,
    git: &str,
    config: &WallpaperConfig,
    parent: &Path,
) -> StepStatus {
    if let Err(err) = fs::create_dir_all(parent) {
        return StepStatus::Failed(format!("cannot create {}: {err}", parent.display()));
    }

    let dest = destination(config, parent);
    if dest.exists() {
        tracing::info!("wallpapers already present at {}", dest.display());
        return StepStatus::AlreadyPresent;
    }

    let argv = vec![
        git.to_string(),
        "clone".to_string(),
        "--depth".to_string(),
        "1".to_string(),
        config.repo.clone(),
        dest.to_string_lossy().into_owned(),
    ];

    match commands.run(&argv) {
        Ok(true) => {
            tracing::info!("cloned {} into {}", config.repo, dest.display());
            StepStatus::Done
        }
        Ok(false) => StepStatus::Failed(format!("git clone {} failed", config.repo)),
        Err(err) => StepStatus::Failed(format!("could not start {git}: {err}")),
    }
}

pub fn destination(config: &WallpaperConfig, parent: &Path) -> PathBuf {
    let name = config
        .dest_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| repo_slug(&config.repo));
    parent.join(name)
}

fn repo_slug(repo: &str) -> String {
    let trimmed = repo.trim_end_matches('/').trim_end_matches(".git");
    trimmed
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("wallpapers")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::tests::ScriptedCommands;

    fn config(repo: &str) -> WallpaperConfig {
        WallpaperConfig {
            repo: repo.to_string(),
            parent_dir: String::new(),
            dest_name: None,
        }
    }

    #[test]
    fn slug_comes_from_repo_url() {
        assert_eq!(repo_slug("https://github.com/acme/nord-background.git"), "nord-background");
        assert_eq!(repo_slug("https://github.com/acme/walls/"), "walls");
        assert_eq!(repo_slug(""), "wallpapers");
    }

    #[test]
    fn explicit_destination_name_wins() {
        let mut cfg = config("https://github.com/acme/nord-background.git");
        cfg.dest_name = Some("backgrounds".to_string());

        assert_eq!(
            destination(&cfg, Path::new("/home/me/Pictures")),
            PathBuf::from("/home/me/Pictures/backgrounds")
        );
    }

    #[test]
    fn existing_destination_skips_clone() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nord-background")).unwrap();
        let commands = ScriptedCommands::new(Vec::new());

        let status = sync(
            &commands,
            "git",
            &config("https://github.com/acme/nord-background.git"),
            dir.path(),
        );

        assert_eq!(status, StepStatus::AlreadyPresent);
        assert!(commands.calls.borrow().is_empty());
    }

    #[test]
    fn creates_parent_and_clones() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("Pictures");
        let commands = ScriptedCommands::new(vec![Ok(true)]);

        let status = sync(
            &commands,
            "git",
            &config("https://github.com/acme/nord-background.git"),
            &parent,
        );

        assert_eq!(status, StepStatus::Done);
        assert!(parent.is_dir());
        let calls = commands.calls.borrow();
        assert_eq!(
            calls[0],
            vec![
                "git".to_string(),
                "clone".to_string(),
                "--depth".to_string(),
                "1".to_string(),
                "https://github.com/acme/nord-background.git".to_string(),
                parent.join("nord-background").to_string_lossy().into_owned(),
            ]
        );
    }

    #[test]
    fn failed_clone_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let commands = ScriptedCommands::new(vec![Ok(false)]);

        let status = sync(&commands, "git", &config("https://github.com/acme/walls.git"), dir.path());

        assert!(matches!(status, StepStatus::Failed(_)));
    }
}
