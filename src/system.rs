use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::cmd;
use crate::error::{ProvisionError, ProvisionResult};

/// Whether a package is present on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Installed,
    NotInstalled,
}

/// Lifecycle actions understood by the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Reload,
    Enable,
}

impl ServiceAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Reload => "reload",
            Self::Enable => "enable",
        }
    }
}

/// Host mutation seam. Every provisioning step talks to the OS
/// through this trait, so the whole pipeline can run against a fake
/// in tests instead of a real package manager and service manager.
pub trait System {
    /// Query whether a package is installed.
    fn package_state(&self, package: &str) -> ProvisionResult<PackageState>;

    /// Install a package through the OS package manager.
    fn install_package(&self, package: &str) -> ProvisionResult<()>;

    /// Write content to an absolute path, creating parent
    /// directories.
    fn write_file(&self, path: &str, content: &str) -> ProvisionResult<()>;

    /// Run a command and capture its stdout.
    fn run(&self, program: &str, args: &[&str]) -> ProvisionResult<String>;

    /// Run a command with bytes piped to its stdin.
    fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8])
    -> ProvisionResult<String>;

    /// Drive a system service.
    fn control_service(&self, service: &str, action: ServiceAction) -> ProvisionResult<()>;

    /// Check whether a path exists on the host.
    fn path_exists(&self, path: &str) -> bool;

    /// Pause so a just-started service can settle.
    fn settle(&self, duration: Duration);
}

/// Real adapter for the local host, expected to run as root.
/// Packages via `apt-get`/`dpkg-query`, services via `systemctl`.
pub struct HostSystem;

impl System for HostSystem {
    fn package_state(&self, package: &str) -> ProvisionResult<PackageState> {
        let (queried, status) =
            cmd::run_unchecked("dpkg-query", &["-W", "-f=${Status}", package])?;
        Ok(parse_dpkg_status(queried, &status))
    }

    fn install_package(&self, package: &str) -> ProvisionResult<()> {
        cmd::run_interactive("apt-get", &["install", "-y", package])
    }

    fn write_file(&self, path: &str, content: &str) -> ProvisionResult<()> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    fn run(&self, program: &str, args: &[&str]) -> ProvisionResult<String> {
        cmd::run(program, args)
    }

    fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        stdin: &[u8],
    ) -> ProvisionResult<String> {
        cmd::run_with_stdin(program, args, stdin)
    }

    fn control_service(&self, service: &str, action: ServiceAction) -> ProvisionResult<()> {
        cmd::run("systemctl", &[action.as_str(), service]).map_err(|e| match e {
            ProvisionError::CommandFailed { .. } => ProvisionError::ServiceFailed(format!(
                "systemctl {} {service}",
                action.as_str()
            )),
            other => other,
        })?;
        Ok(())
    }

    fn path_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn settle(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Interpret a `dpkg-query -W -f=${Status}` result. A removed
/// package with leftover config files still exits zero, so the
/// status text decides, not the exit code.
#[must_use]
pub fn parse_dpkg_status(queried: bool, status: &str) -> PackageState {
    if queried && status.contains("install ok installed") {
        PackageState::Installed
    } else {
        PackageState::NotInstalled
    }
}

/// Outcome of the package-presence helper. The numeric codes match
/// the statuses callers log and branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageCheck {
    /// Package is present (0).
    Installed,
    /// Called with anything other than exactly one argument (1).
    InvalidUsage,
    /// Package name is empty or whitespace-only (2).
    InvalidName,
    /// Package is absent (3).
    NotInstalled,
}

impl PackageCheck {
    /// Stable numeric status code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Installed => 0,
            Self::InvalidUsage => 1,
            Self::InvalidName => 2,
            Self::NotInstalled => 3,
        }
    }
}

/// Check whether a single named package is installed.
///
/// Takes the raw argument list so callers forwarding arguments get
/// the usage check for free: exactly one non-blank name is required.
/// A failed query counts as not installed.
#[must_use]
pub fn is_package_installed(system: &dyn System, args: &[&str]) -> PackageCheck {
    let [package] = args else {
        return PackageCheck::InvalidUsage;
    };

    if package.trim().is_empty() {
        return PackageCheck::InvalidName;
    }

    match system.package_state(package) {
        Ok(PackageState::Installed) => PackageCheck::Installed,
        Ok(PackageState::NotInstalled) | Err(_) => PackageCheck::NotInstalled,
    }
}

/// Install a package unless it is already present. Safe to call
/// repeatedly; the second call is a no-op.
pub fn ensure_package(system: &dyn System, package: &str) -> ProvisionResult<()> {
    match is_package_installed(system, &[package]) {
        PackageCheck::Installed => {
            eprintln!("  {package} already installed, skipping");
            Ok(())
        }
        PackageCheck::NotInstalled => {
            eprintln!("  installing {package}...");
            system.install_package(package)?;
            eprintln!("  {package} installed");
            Ok(())
        }
        status @ (PackageCheck::InvalidUsage | PackageCheck::InvalidName) => Err(
            ProvisionError::Other(format!("invalid package name (status {})", status.code())),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_status_text_is_installed() {
        assert_eq!(
            parse_dpkg_status(true, "install ok installed"),
            PackageState::Installed
        );
    }

    #[test]
    fn config_files_remnant_is_not_installed() {
        assert_eq!(
            parse_dpkg_status(true, "deinstall ok config-files"),
            PackageState::NotInstalled
        );
    }

    #[test]
    fn failed_query_is_not_installed() {
        assert_eq!(parse_dpkg_status(false, ""), PackageState::NotInstalled);
    }
}
