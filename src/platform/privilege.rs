/// Read-only view of the privilege this process already holds.
pub trait PrivilegeCheck {
    fn is_elevated(&self) -> bool;
}

/// The running process's own privilege, as reported by the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPrivilege;

impl PrivilegeCheck for SystemPrivilege {
    #[cfg(unix)]
    fn is_elevated(&self) -> bool {
        nix::unistd::Uid::effective().is_root()
    }

    #[cfg(windows)]
    fn is_elevated(&self) -> bool {
        // `net session` is refused to non-administrators.
        std::process::Command::new("net")
            .arg("session")
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or_else(|err| {
                tracing::warn!("privilege query failed, assuming not elevated: {err}");
                false
            })
    }

    #[cfg(not(any(unix, windows)))]
    fn is_elevated(&self) -> bool {
        false
    }
}

/// Whether the payload has to be started in a new elevated process.
pub fn needs_elevation(privilege: &dyn PrivilegeCheck) -> bool {
    !privilege.is_elevated()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(bool);

    impl PrivilegeCheck for Fixed {
        fn is_elevated(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn elevation_needed_only_when_not_elevated() {
        assert!(needs_elevation(&Fixed(false)));
        assert!(!needs_elevation(&Fixed(true)));
    }

    #[cfg(unix)]
    #[test]
    fn system_privilege_matches_effective_uid() {
        let expected = nix::unistd::geteuid().as_raw() == 0;

        assert_eq!(SystemPrivilege.is_elevated(), expected);
    }
}
