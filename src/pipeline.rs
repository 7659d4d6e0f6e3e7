use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::App;
use crate::certs;
use crate::cmd;
use crate::config::{CertMethod, Config};
use crate::database;
use crate::envfile;
use crate::error::{ProvisionError, ProvisionResult};
use crate::nginx;
use crate::source;
use crate::supervisor;
use crate::system::{HostSystem, ServiceAction, System, ensure_package};

const FRONTEND_NAME: &str = "web";
const BACKEND_NAME: &str = "api";

const BASE_PACKAGES: &[&str] = &["git", "curl", "gnupg", "nginx", "nodejs", "npm", "openssl"];

/// Provisioning pipeline: one ordered pass over the named steps
/// that take a bare host to a running stack.
pub struct Pipeline {
    install_command: String,
    frontend_build: String,
    frontend_start: String,
    backend_start: String,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            install_command: "npm install".to_string(),
            frontend_build: "npm run build".to_string(),
            frontend_start: "npm start".to_string(),
            backend_start: "npm start".to_string(),
        }
    }

    #[must_use]
    pub fn install_command(mut self, command: &str) -> Self {
        self.install_command = command.to_string();
        self
    }

    #[must_use]
    pub fn frontend_build(mut self, command: &str) -> Self {
        self.frontend_build = command.to_string();
        self
    }

    #[must_use]
    pub fn frontend_start(mut self, command: &str) -> Self {
        self.frontend_start = command.to_string();
        self
    }

    #[must_use]
    pub fn backend_start(mut self, command: &str) -> Self {
        self.backend_start = command.to_string();
        self
    }

    /// Parse CLI arguments and dispatch the appropriate command.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatched command fails; the
    /// consumer's `main` turns that into a non-zero exit.
    pub fn run(&self) -> ProvisionResult<()> {
        let cli = Cli::parse();

        match &cli.command {
            Command::Run { config, dry_run } => {
                let config = Config::load(config)?;
                if *dry_run {
                    self.cmd_dry_run(&config)
                } else {
                    check_host_prerequisites()?;
                    self.execute(&HostSystem, &config)
                }
            }
            Command::Status => supervisor::status(&HostSystem),
            Command::Remove { config } => {
                let config = Config::load(config)?;
                self.remove(&HostSystem, &config)
            }
        }
    }

    /// Run every provisioning step in dependency order against the
    /// given system adapter. Any step failure aborts the run; steps
    /// are idempotent, so re-running after a fix is the recovery
    /// path.
    pub fn execute(&self, system: &dyn System, config: &Config) -> ProvisionResult<()> {
        config.validate()?;

        let frontend = self.frontend_app(config);
        let backend = self.backend_app(config);
        let frontend_dir = config.app_dir(FRONTEND_NAME);
        let backend_dir = config.app_dir(BACKEND_NAME);
        let cert_paths = certs::expected_paths(&config.cert, &config.domain);

        let steps: Vec<Step> = vec![
            Step {
                name: "base packages",
                run: Box::new(|system: &dyn System| install_base_packages(system, config)),
            },
            Step {
                name: "database",
                run: Box::new(|system: &dyn System| database::install(system, config)),
            },
            Step {
                name: "frontend checkout",
                run: Box::new(|system: &dyn System| {
                    source::checkout(system, &frontend, &frontend_dir)
                }),
            },
            Step {
                name: "backend checkout",
                run: Box::new(|system: &dyn System| {
                    source::checkout(system, &backend, &backend_dir)
                }),
            },
            Step {
                name: "frontend dependencies and build",
                run: Box::new(|system: &dyn System| {
                    source::install_dependencies(system, &frontend, &frontend_dir)?;
                    source::build(system, &frontend, &frontend_dir)?;
                    Ok(())
                }),
            },
            Step {
                name: "backend dependencies",
                run: Box::new(|system: &dyn System| {
                    source::install_dependencies(system, &backend, &backend_dir)
                }),
            },
            Step {
                name: "backend environment file",
                run: Box::new(|system: &dyn System| {
                    write_backend_env(system, config, &backend_dir)
                }),
            },
            Step {
                name: "supervise processes",
                run: Box::new(|system: &dyn System| {
                    supervisor::start(system, &backend, &backend_dir)?;
                    supervisor::start(system, &frontend, &frontend_dir)?;
                    Ok(())
                }),
            },
            Step {
                name: "certificate",
                run: Box::new(|system: &dyn System| {
                    certs::provisioner_for(&config.cert)
                        .provision(system, config)
                        .map(|_| ())
                }),
            },
            Step {
                name: "reverse proxy",
                run: Box::new(|system: &dyn System| activate_proxy(system, config, &cert_paths)),
            },
        ];

        let total = steps.len();
        for (index, step) in steps.iter().enumerate() {
            eprintln!("[{}/{total}] {}", index + 1, step.name);
            (step.run)(system)?;
        }

        eprintln!();
        eprintln!("Provisioning complete!");
        eprintln!("Site available at: https://{}", config.domain);
        eprintln!("Admin available at: https://{}", config.admin_domain());

        Ok(())
    }

    /// Manual dev cleanup: stop supervised processes and deactivate
    /// the proxy site. Installed packages and the database stay.
    #[allow(clippy::unused_self)]
    pub fn remove(&self, system: &dyn System, config: &Config) -> ProvisionResult<()> {
        supervisor::delete(system, BACKEND_NAME)?;
        supervisor::delete(system, FRONTEND_NAME)?;

        let enabled = nginx::enabled_path(&config.domain);
        if system.path_exists(&enabled) {
            system.run("rm", &["-f", &enabled])?;
            system.control_service("nginx", ServiceAction::Restart)?;
            eprintln!("Proxy site deactivated");
        }

        eprintln!("Cleanup complete!");
        Ok(())
    }

    #[allow(clippy::unnecessary_wraps)]
    fn cmd_dry_run(&self, config: &Config) -> ProvisionResult<()> {
        let cert_paths = certs::expected_paths(&config.cert, &config.domain);
        let site = nginx::site(config, &cert_paths);

        eprintln!("=== Dry run: no changes will be made ===");
        eprintln!();

        eprintln!("--- backend .env ---");
        println!("{}", envfile::backend_env(config).render());

        eprintln!("--- mongod.service ---");
        println!("{}", database::unit_file());

        eprintln!("--- nginx site ({}) ---", nginx::site_path(&config.domain));
        println!("{}", nginx::render(&site));

        eprintln!("--- supervised processes ---");
        eprintln!(
            "{FRONTEND_NAME}: {} (cwd {})",
            supervisor::launch_command(&self.frontend_app(config)),
            config.app_dir(FRONTEND_NAME)
        );
        eprintln!(
            "{BACKEND_NAME}: {} (cwd {})",
            supervisor::launch_command(&self.backend_app(config)),
            config.app_dir(BACKEND_NAME)
        );

        Ok(())
    }

    fn frontend_app(&self, config: &Config) -> App {
        App::new(FRONTEND_NAME, &config.frontend_repo)
            .branch(&config.frontend_branch)
            .port(config.frontend_port)
            .env("PORT", &config.frontend_port.to_string())
            .install_command(&self.install_command)
            .build_command(&self.frontend_build)
            .start_command(&self.frontend_start)
    }

    fn backend_app(&self, config: &Config) -> App {
        App::new(BACKEND_NAME, &config.backend_repo)
            .branch(&config.backend_branch)
            .port(config.backend_port)
            .install_command(&self.install_command)
            .start_command(&self.backend_start)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

struct Step<'a> {
    name: &'static str,
    run: Box<dyn Fn(&dyn System) -> ProvisionResult<()> + 'a>,
}

/// The pipeline drives apt and systemd directly; refuse to start on
/// a host without them.
fn check_host_prerequisites() -> ProvisionResult<()> {
    for tool in ["apt-get", "systemctl"] {
        if !cmd::command_exists(tool) {
            return Err(ProvisionError::PrerequisiteMissing(tool.to_string()));
        }
    }
    Ok(())
}

fn install_base_packages(system: &dyn System, config: &Config) -> ProvisionResult<()> {
    system.run("apt-get", &["update"])?;
    for package in BASE_PACKAGES {
        ensure_package(system, package)?;
    }
    if matches!(&config.cert, CertMethod::Acme { .. }) {
        ensure_package(system, "certbot")?;
    }
    ensure_supervisor_installed(system)
}

fn write_backend_env(system: &dyn System, config: &Config, backend_dir: &str) -> ProvisionResult<()> {
    let env_path = format!("{backend_dir}/.env");
    system.write_file(&env_path, &envfile::backend_env(config).render())?;
    system.run("chmod", &["600", &env_path])?;
    Ok(())
}

fn activate_proxy(
    system: &dyn System,
    config: &Config,
    cert_paths: &certs::CertPaths,
) -> ProvisionResult<()> {
    let site = nginx::site(config, cert_paths);
    let available = nginx::site_path(&config.domain);
    let enabled = nginx::enabled_path(&config.domain);

    system.write_file(&available, &nginx::render(&site))?;
    system.run("ln", &["-sf", &available, &enabled])?;
    system.run("nginx", &["-t"])?;
    system.control_service("nginx", ServiceAction::Restart)
}

/// The process supervisor is installed through npm, not apt, so it
/// gets its own guard.
fn ensure_supervisor_installed(system: &dyn System) -> ProvisionResult<()> {
    if system.run("pm2", &["--version"]).is_ok() {
        eprintln!("  pm2 already installed, skipping");
        return Ok(());
    }
    eprintln!("  installing pm2...");
    system.run("npm", &["install", "-g", "pm2"])?;
    Ok(())
}

#[derive(Parser)]
#[command(name = "stacklift")]
#[command(about = "Single-VM stack provisioning")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Provision the host end to end
    Run {
        /// Path to the YAML run configuration
        #[arg(long, default_value = "stacklift.yml")]
        config: PathBuf,

        /// Print generated files without touching the host
        #[arg(long)]
        dry_run: bool,
    },

    /// Show supervised process status
    Status,

    /// Stop supervised processes and deactivate the proxy site
    Remove {
        /// Path to the YAML run configuration
        #[arg(long, default_value = "stacklift.yml")]
        config: PathBuf,
    },
}
