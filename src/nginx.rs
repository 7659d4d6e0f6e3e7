use crate::certs::CertPaths;
use crate::config::Config;

/// One proxied virtual host: a server name forwarded to a local
/// upstream port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VHost {
    pub server_name: String,
    pub upstream_port: u16,
}

/// Configuration for the nginx reverse proxy site.
///
/// # Example
///
/// ```
/// use stacklift::Nginx;
///
/// let nginx = Nginx::new()
///     .redirect_http()
///     .vhost("forum.example.com", 3000)
///     .vhost("admin.forum.example.com", 8080);
///
/// assert!(nginx.redirect_http);
/// assert_eq!(nginx.vhosts.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Nginx {
    pub redirect_http: bool,
    pub vhosts: Vec<VHost>,
    pub cert: Option<CertPaths>,
    pub extra_directives: Vec<String>,
}

impl Nginx {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn redirect_http(mut self) -> Self {
        self.redirect_http = true;
        self
    }

    #[must_use]
    pub fn vhost(mut self, server_name: &str, upstream_port: u16) -> Self {
        self.vhosts.push(VHost {
            server_name: server_name.to_string(),
            upstream_port,
        });
        self
    }

    #[must_use]
    pub fn cert(mut self, paths: CertPaths) -> Self {
        self.cert = Some(paths);
        self
    }

    #[must_use]
    pub fn directive(mut self, raw: &str) -> Self {
        self.extra_directives.push(raw.to_string());
        self
    }
}

/// Build the site for a run: HTTP redirect plus the public site on
/// the frontend port and the admin subdomain on the backend port.
#[must_use]
pub fn site(config: &Config, cert: &CertPaths) -> Nginx {
    Nginx::new()
        .redirect_http()
        .vhost(&config.domain, config.frontend_port)
        .vhost(&config.admin_domain(), config.backend_port)
        .cert(cert.clone())
}

/// Render the complete site configuration.
#[must_use]
pub fn render(nginx: &Nginx) -> String {
    let mut out = String::new();

    if nginx.redirect_http {
        let names: Vec<&str> = nginx
            .vhosts
            .iter()
            .map(|v| v.server_name.as_str())
            .collect();
        out.push_str("server {\n");
        out.push_str("    listen 80;\n");
        out.push_str(&format!("    server_name {};\n", names.join(" ")));
        out.push_str("    return 301 https://$host$request_uri;\n");
        out.push_str("}\n");
    }

    for vhost in &nginx.vhosts {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("server {\n");
        if let Some(cert) = &nginx.cert {
            out.push_str("    listen 443 ssl;\n");
            out.push_str(&format!("    server_name {};\n", vhost.server_name));
            out.push_str(&format!("    ssl_certificate {};\n", cert.cert));
            out.push_str(&format!("    ssl_certificate_key {};\n", cert.key));
        } else {
            out.push_str("    listen 80;\n");
            out.push_str(&format!("    server_name {};\n", vhost.server_name));
        }
        for directive in &nginx.extra_directives {
            out.push_str(&format!("    {directive};\n"));
        }
        out.push_str("    location / {\n");
        out.push_str(&format!(
            "        proxy_pass http://127.0.0.1:{};\n",
            vhost.upstream_port
        ));
        out.push_str("        proxy_set_header Host $host;\n");
        out.push_str("        proxy_set_header X-Real-IP $remote_addr;\n");
        out.push_str("        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;\n");
        out.push_str("        proxy_set_header X-Forwarded-Proto $scheme;\n");
        out.push_str("    }\n");
        out.push_str("}\n");
    }

    out
}

/// Path of the generated site file.
#[must_use]
pub fn site_path(domain: &str) -> String {
    format!("/etc/nginx/sites-available/{domain}")
}

/// Path of the activation symlink.
#[must_use]
pub fn enabled_path(domain: &str) -> String {
    format!("/etc/nginx/sites-enabled/{domain}")
}
