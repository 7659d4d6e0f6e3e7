use crate::config::{CertMethod, Config};
use crate::error::ProvisionResult;
use crate::system::System;

/// Where the issued certificate pair lives on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPaths {
    pub cert: String,
    pub key: String,
}

/// A certificate provisioner obtains a TLS pair for the public
/// domain and its admin subdomain.
pub trait CertProvisioner {
    fn provision(&self, system: &dyn System, config: &Config) -> ProvisionResult<CertPaths>;
}

/// Paths a method will place the pair at. Computable before
/// provisioning runs, so the proxy config can be rendered from
/// them.
#[must_use]
pub fn expected_paths(method: &CertMethod, domain: &str) -> CertPaths {
    match method {
        CertMethod::SelfSigned { .. } => self_signed_paths(domain),
        CertMethod::Acme { .. } => acme_paths(domain),
    }
}

fn self_signed_paths(domain: &str) -> CertPaths {
    CertPaths {
        cert: format!("/etc/ssl/certs/{domain}.crt"),
        key: format!("/etc/ssl/private/{domain}.key"),
    }
}

fn acme_paths(domain: &str) -> CertPaths {
    CertPaths {
        cert: format!("/etc/letsencrypt/live/{domain}/fullchain.pem"),
        key: format!("/etc/letsencrypt/live/{domain}/privkey.pem"),
    }
}

/// Pick the provisioner matching the configured method.
#[must_use]
pub fn provisioner_for(method: &CertMethod) -> Box<dyn CertProvisioner> {
    match method {
        CertMethod::SelfSigned {
            days,
            country,
            state,
            organization,
        } => Box::new(SelfSigned {
            days: *days,
            country: country.clone(),
            state: state.clone(),
            organization: organization.clone(),
        }),
        CertMethod::Acme { email } => Box::new(Acme {
            email: email.clone(),
        }),
    }
}

/// Self-signed pair generated with `openssl`. Good enough for
/// staging hosts that never see a public CA.
pub struct SelfSigned {
    pub days: u32,
    pub country: String,
    pub state: String,
    pub organization: String,
}

impl SelfSigned {
    /// `-subj` argument for the certificate request.
    #[must_use]
    pub fn subject(&self, domain: &str) -> String {
        let mut subject = format!("/C={}/ST={}", self.country, self.state);
        if !self.organization.is_empty() {
            subject.push_str("/O=");
            subject.push_str(&self.organization);
        }
        subject.push_str("/CN=");
        subject.push_str(domain);
        subject
    }
}

impl CertProvisioner for SelfSigned {
    fn provision(&self, system: &dyn System, config: &Config) -> ProvisionResult<CertPaths> {
        let paths = self_signed_paths(&config.domain);

        if system.path_exists(&paths.cert) && system.path_exists(&paths.key) {
            eprintln!("  certificate for {} already present, skipping", config.domain);
            return Ok(paths);
        }

        eprintln!(
            "  generating self-signed certificate for {} ({} days)",
            config.domain, self.days
        );
        let days = self.days.to_string();
        let san = format!(
            "subjectAltName=DNS:{},DNS:{}",
            config.domain,
            config.admin_domain()
        );
        system.run(
            "openssl",
            &[
                "req",
                "-x509",
                "-nodes",
                "-newkey",
                "rsa:2048",
                "-days",
                &days,
                "-keyout",
                &paths.key,
                "-out",
                &paths.cert,
                "-subj",
                &self.subject(&config.domain),
                "-addext",
                &san,
            ],
        )?;

        Ok(paths)
    }
}

/// ACME issuance via certbot in standalone mode. Runs before the
/// proxy is activated, so port 80 is free for the challenge.
pub struct Acme {
    pub email: String,
}

impl CertProvisioner for Acme {
    fn provision(&self, system: &dyn System, config: &Config) -> ProvisionResult<CertPaths> {
        let paths = acme_paths(&config.domain);

        if system.path_exists(&paths.cert) {
            eprintln!("  certificate for {} already issued, skipping", config.domain);
            return Ok(paths);
        }

        eprintln!("  requesting ACME certificate for {}", config.domain);
        let admin = config.admin_domain();
        system.run(
            "certbot",
            &[
                "certonly",
                "--standalone",
                "--non-interactive",
                "--agree-tos",
                "-m",
                &self.email,
                "-d",
                &config.domain,
                "-d",
                &admin,
            ],
        )?;

        Ok(paths)
    }
}
