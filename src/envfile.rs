use indexmap::IndexMap;

use crate::config::Config;

/// An ordered `key=value` runtime configuration file. Keys keep
/// insertion order so generated files diff cleanly between runs.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    entries: IndexMap<String, String>,
}

impl EnvFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

/// Build the backend's runtime environment file from the run
/// configuration: listen port, database URI, OAuth and
/// object-storage credentials.
#[must_use]
pub fn backend_env(config: &Config) -> EnvFile {
    EnvFile::new()
        .set("NODE_ENV", "production")
        .set("PORT", &config.backend_port.to_string())
        .set("MONGODB_URI", &config.mongo_uri())
        .set("OAUTH_CLIENT_ID", &config.oauth.client_id)
        .set("OAUTH_CLIENT_SECRET", &config.oauth.client_secret)
        .set("S3_REGION", &config.storage.region)
        .set("S3_ACCESS_KEY", &config.storage.access_key)
        .set("S3_SECRET_KEY", &config.storage.secret_key)
        .set("S3_BUCKET", &config.storage.bucket)
}
