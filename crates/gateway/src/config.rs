//! Server configuration.
//!
//! Precedence, lowest to highest: built-in defaults, optional TOML file,
//! `LADDER_*` environment variables. CLI flags are applied on top by the
//! binary.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// sqlx database URL for the artifact store.
    pub database_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite://ladder.db?mode=rwc".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file when one exists, then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => toml::from_str(&std::fs::read_to_string(path)?)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `LADDER_BIND`, `LADDER_PORT`, and `LADDER_DATABASE_URL`.
    /// An unparsable port is ignored rather than fatal.
    pub fn apply_env(&mut self) {
        if let Ok(bind) = std::env::var("LADDER_BIND") {
            self.bind = bind;
        }
        if let Ok(port) = std::env::var("LADDER_PORT")
            && let Ok(port) = port.parse()
        {
            self.port = port;
        }
        if let Ok(url) = std::env::var("LADDER_DATABASE_URL") {
            self.database_url = url;
        }
    }

    /// `bind:port` as a socket address string.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_local() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ServerConfig::load(Some(Path::new("/nonexistent/ladder.toml"))).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind = \"0.0.0.0\"\nport = 9000").unwrap();
        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url, ServerConfig::default().database_url);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prot = 9000").unwrap();
        assert!(ServerConfig::load(Some(file.path())).is_err());
    }
}
