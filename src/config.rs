use std::path::Path;

use serde::Deserialize;

use crate::error::{ProvisionError, ProvisionResult};

/// Everything a provisioning run needs, constructed once at startup
/// and passed into each step. No ambient globals.
///
/// Loaded from a YAML file; optional values fall back to defaults.
///
/// # Example
///
/// ```
/// use stacklift::Config;
///
/// let config = Config::from_yaml(
///     r#"
/// domain: forum.example.com
/// frontend_repo: https://git.example.com/forum-web.git
/// backend_repo: https://git.example.com/forum-api.git
/// db:
///   name: forum
///   user: forum
///   password: s3cret
/// oauth:
///   client_id: abc
///   client_secret: def
/// storage:
///   region: us-east-1
///   access_key: AKIA
///   secret_key: wJal
///   bucket: forum-uploads
/// "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.backend_port, 8080);
/// assert_eq!(config.admin_domain(), "admin.forum.example.com");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fully-qualified domain the public site is served on.
    pub domain: String,
    pub frontend_repo: String,
    #[serde(default = "default_branch")]
    pub frontend_branch: String,
    pub backend_repo: String,
    #[serde(default = "default_branch")]
    pub backend_branch: String,
    #[serde(default = "default_frontend_port")]
    pub frontend_port: u16,
    #[serde(default = "default_backend_port")]
    pub backend_port: u16,
    /// MongoDB release series to install, e.g. "7.0".
    #[serde(default = "default_db_version")]
    pub db_version: String,
    #[serde(default = "default_install_dir")]
    pub install_dir: String,
    pub db: DbConfig,
    pub oauth: OauthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub cert: CertMethod,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

/// How the TLS certificate is obtained.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case", deny_unknown_fields)]
pub enum CertMethod {
    /// `openssl`-generated self-signed pair.
    SelfSigned {
        #[serde(default = "default_cert_days")]
        days: u32,
        #[serde(default = "default_cert_country")]
        country: String,
        #[serde(default = "default_cert_state")]
        state: String,
        #[serde(default)]
        organization: String,
    },
    /// ACME issuance via certbot.
    Acme { email: String },
}

impl Default for CertMethod {
    fn default() -> Self {
        Self::SelfSigned {
            days: default_cert_days(),
            country: default_cert_country(),
            state: default_cert_state(),
            organization: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> ProvisionResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ProvisionError::FileNotFound(path.display().to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ProvisionResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty required values before any step runs.
    pub fn validate(&self) -> ProvisionResult<()> {
        let required = [
            ("domain", &self.domain),
            ("frontend_repo", &self.frontend_repo),
            ("backend_repo", &self.backend_repo),
            ("db.name", &self.db.name),
            ("db.user", &self.db.user),
            ("db.password", &self.db.password),
            ("oauth.client_id", &self.oauth.client_id),
            ("oauth.client_secret", &self.oauth.client_secret),
            ("storage.region", &self.storage.region),
            ("storage.access_key", &self.storage.access_key),
            ("storage.secret_key", &self.storage.secret_key),
            ("storage.bucket", &self.storage.bucket),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ProvisionError::ConfigMissing(name.to_string()));
            }
        }

        if let CertMethod::Acme { email } = &self.cert {
            if email.trim().is_empty() {
                return Err(ProvisionError::ConfigMissing("cert.email".to_string()));
            }
        }

        Ok(())
    }

    /// The admin interface is served on a fixed subdomain of the
    /// public domain.
    #[must_use]
    pub fn admin_domain(&self) -> String {
        format!("admin.{}", self.domain)
    }

    /// Second-level domain of the configured FQDN:
    /// `forum.example.com` -> `example.com`.
    #[must_use]
    pub fn second_level_domain(&self) -> String {
        let labels: Vec<&str> = self.domain.split('.').collect();
        if labels.len() <= 2 {
            self.domain.clone()
        } else {
            labels[labels.len() - 2..].join(".")
        }
    }

    /// Bare label of the second-level domain:
    /// `forum.example.com` -> `example`.
    #[must_use]
    pub fn domain_label(&self) -> String {
        self.second_level_domain()
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Connection URI the backend uses to reach the database.
    #[must_use]
    pub fn mongo_uri(&self) -> String {
        format!(
            "mongodb://{}:{}@{}:{}/{}",
            self.db.user, self.db.password, self.db.host, self.db.port, self.db.name
        )
    }

    /// Checkout directory for a named tier.
    #[must_use]
    pub fn app_dir(&self, name: &str) -> String {
        format!("{}/{name}", self.install_dir)
    }
}

fn default_branch() -> String {
    "main".to_string()
}

const fn default_frontend_port() -> u16 {
    3000
}

const fn default_backend_port() -> u16 {
    8080
}

fn default_db_version() -> String {
    "7.0".to_string()
}

fn default_install_dir() -> String {
    "/opt/stack".to_string()
}

const fn default_cert_days() -> u32 {
    365
}

fn default_cert_country() -> String {
    "US".to_string()
}

fn default_cert_state() -> String {
    "California".to_string()
}

fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_db_port() -> u16 {
    27017
}
