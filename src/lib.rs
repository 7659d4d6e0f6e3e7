//! Single-VM provisioning DSL for Rust.
//!
//! Stacklift takes one bare Linux host to a running two-tier web
//! application - a frontend and a backend process behind an nginx
//! reverse proxy, backed by MongoDB - from a typed Rust pipeline.
//! No shell scripts, no copy-pasted server notes.
//!
//! # Overview
//!
//! A run is described by a [`Config`] (domain, repositories,
//! credentials, ports) loaded from a YAML file, and driven by a
//! [`Pipeline`] that executes named provisioning steps in
//! dependency order:
//!
//! 1. **Packages** - OS packages and the process supervisor
//! 2. **Database** - install MongoDB, write its service unit,
//!    start it, create the application user
//! 3. **Sources** - clone or pull both repositories
//! 4. **Build** - install dependencies; the frontend build retries
//!    a flat number of times to ride out transient memory pressure
//! 5. **Runtime config** - write the backend's `.env` file
//! 6. **Supervisor** - start both tiers under pm2
//! 7. **Certificate** - self-signed or ACME, via
//!    [`CertProvisioner`](certs::CertProvisioner)
//! 8. **Proxy** - write and activate the nginx site
//!    (HTTP -> HTTPS redirect, public site, admin subdomain)
//!
//! Every step is idempotent: re-running a pipeline after a failure
//! skips the work that already happened. Any step failure aborts
//! the run with a non-zero exit.
//!
//! Host access goes through the [`System`](system::System) trait,
//! so the whole pipeline runs against a fake adapter in tests.
//!
//! # Example
//!
//! Create an `xtask/src/main.rs` in your project:
//!
//! ```rust,no_run
//! use stacklift::Pipeline;
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new()
//!         .frontend_build("npm run build")
//!         .frontend_start("npm run serve")
//!         .backend_start("node server.js");
//!
//!     pipeline.run()?;
//!     Ok(())
//! }
//! ```
//!
//! Then:
//!
//! ```sh
//! # Provision the host described by stacklift.yml
//! cargo xtask run --config stacklift.yml
//!
//! # Preview generated files without touching the host
//! cargo xtask run --config stacklift.yml --dry-run
//!
//! # Stop the processes and deactivate the proxy site
//! cargo xtask remove --config stacklift.yml
//! ```
//!
//! A minimal `stacklift.yml`:
//!
//! ```yaml
//! domain: forum.example.com
//! frontend_repo: https://git.example.com/forum-web.git
//! backend_repo: https://git.example.com/forum-api.git
//! db:
//!   name: forum
//!   user: forum
//!   password: s3cret
//! oauth:
//!   client_id: abc
//!   client_secret: def
//! storage:
//!   region: us-east-1
//!   access_key: AKIA
//!   secret_key: wJal
//!   bucket: forum-uploads
//! cert:
//!   method: acme
//!   email: ops@example.com
//! ```

// Allow noisy pedantic lints that don't add value for a
// provisioning tool crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod app;
pub mod certs;
pub mod cmd;
pub mod config;
pub mod database;
pub mod envfile;
pub mod error;
pub mod nginx;
pub mod pipeline;
pub mod retry;
pub mod source;
pub mod supervisor;
pub mod system;

pub use app::App;
pub use certs::{Acme, CertPaths, CertProvisioner, SelfSigned};
pub use config::{CertMethod, Config};
pub use envfile::EnvFile;
pub use nginx::Nginx;
pub use pipeline::Pipeline;
pub use retry::{DEFAULT_MAX_RUNS, run_with_retry};
pub use system::{HostSystem, PackageCheck, System, ensure_package, is_package_installed};
