use std::time::Duration;

use crate::config::Config;
use crate::error::{ProvisionError, ProvisionResult};
use crate::system::{PackageCheck, ServiceAction, System, ensure_package, is_package_installed};

const PACKAGE: &str = "mongodb-org";
const SERVICE: &str = "mongod";
const UNIT_PATH: &str = "/etc/systemd/system/mongod.service";

/// OS identification parsed from `/etc/os-release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsRelease {
    pub id: String,
    pub codename: String,
}

const SUPPORTED_CODENAMES: &[&str] = &["focal", "jammy", "noble"];

/// Parse `/etc/os-release` content and reject anything the
/// database vendor does not publish packages for. Unsupported
/// releases are fatal to the run.
pub fn detect_release(os_release: &str) -> ProvisionResult<OsRelease> {
    let mut id = None;
    let mut codename = None;

    for line in os_release.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            id = Some(value.trim_matches('"').to_string());
        } else if let Some(value) = line.strip_prefix("VERSION_CODENAME=") {
            codename = Some(value.trim_matches('"').to_string());
        }
    }

    let id = id.ok_or_else(|| ProvisionError::UnsupportedRelease("missing ID field".into()))?;
    let codename = codename
        .ok_or_else(|| ProvisionError::UnsupportedRelease("missing VERSION_CODENAME".into()))?;

    if id != "ubuntu" || !SUPPORTED_CODENAMES.contains(&codename.as_str()) {
        return Err(ProvisionError::UnsupportedRelease(format!(
            "{id} {codename}"
        )));
    }

    Ok(OsRelease { id, codename })
}

/// Keyring path for a MongoDB release series.
#[must_use]
pub fn keyring_path(version: &str) -> String {
    format!("/usr/share/keyrings/mongodb-server-{version}.gpg")
}

/// APT source line for the vendor repository.
#[must_use]
pub fn apt_source_line(release: &OsRelease, version: &str) -> String {
    format!(
        "deb [ arch=amd64,arm64 signed-by={} ] \
         https://repo.mongodb.org/apt/ubuntu {}/mongodb-org/{version} multiverse",
        keyring_path(version),
        release.codename
    )
}

/// Systemd unit for the database daemon.
#[must_use]
pub fn unit_file() -> String {
    "\
[Unit]
Description=MongoDB Database Server
After=network-online.target
Wants=network-online.target

[Service]
User=mongodb
Group=mongodb
ExecStart=/usr/bin/mongod --config /etc/mongod.conf
PIDFile=/var/run/mongodb/mongod.pid
LimitNOFILE=64000
LimitNPROC=64000

[Install]
WantedBy=multi-user.target
"
    .to_string()
}

/// Shell-JS bootstrap creating the application database user.
/// Skips creation when the user already exists, so re-runs are
/// safe.
#[must_use]
pub fn bootstrap_script(config: &Config) -> String {
    format!(
        "db = db.getSiblingDB(\"{name}\");\n\
         if (db.getUser(\"{user}\") === null) {{\n  \
         db.createUser({{\n    \
         user: \"{user}\",\n    \
         pwd: \"{password}\",\n    \
         roles: [{{ role: \"readWrite\", db: \"{name}\" }}]\n  \
         }});\n}}\n",
        name = config.db.name,
        user = config.db.user,
        password = config.db.password,
    )
}

/// Install the database engine, write its service unit, start it,
/// and create the application user.
pub fn install(system: &dyn System, config: &Config) -> ProvisionResult<()> {
    if is_package_installed(system, &[PACKAGE]) == PackageCheck::Installed {
        eprintln!("  {PACKAGE} already installed, skipping repository setup");
    } else {
        let os_release = system.run("cat", &["/etc/os-release"])?;
        let release = detect_release(&os_release)?;

        let keyring = keyring_path(&config.db_version);
        if !system.path_exists(&keyring) {
            system.run(
                "sh",
                &[
                    "-c",
                    &format!(
                        "curl -fsSL https://www.mongodb.org/static/pgp/server-{v}.asc \
                         | gpg --dearmor -o {keyring}",
                        v = config.db_version
                    ),
                ],
            )?;
        }

        system.write_file(
            &format!("/etc/apt/sources.list.d/mongodb-org-{}.list", config.db_version),
            &format!("{}\n", apt_source_line(&release, &config.db_version)),
        )?;

        system.run("apt-get", &["update"])?;
        ensure_package(system, PACKAGE)?;
    }

    if !system.path_exists(UNIT_PATH) {
        system.write_file(UNIT_PATH, &unit_file())?;
        system.run("systemctl", &["daemon-reload"])?;
    }

    system.control_service(SERVICE, ServiceAction::Enable)?;
    system.control_service(SERVICE, ServiceAction::Start)?;

    // Flat settle wait before talking to the daemon.
    system.settle(Duration::from_secs(3));

    eprintln!("  creating database user '{}'", config.db.user);
    system.run_with_stdin(
        "mongosh",
        &["--quiet"],
        bootstrap_script(config).as_bytes(),
    )?;

    Ok(())
}
