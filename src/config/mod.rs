// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, StoreConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "docshell";

impl Config {
    /// Load configuration from the given file path (extension optional)
    ///
    /// Layers, lowest priority first: built-in defaults, the config file if
    /// present, `DOCSHELL_*` environment variables (`__` separates nested keys),
    /// then the plain `MONGO_URI` and `PORT` variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::layered(
            config_path,
            std::env::var("MONGO_URI").ok(),
            std::env::var("PORT").ok(),
        )
    }

    fn layered(
        config_path: &str,
        mongo_uri: Option<String>,
        port: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let defaults = StoreConfig::default();
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("store.uri", defaults.uri)?
            .set_default("store.database", defaults.database)?
            .set_default("store.collection", defaults.collection)?
            .set_default("store.app_name", defaults.app_name)?
            .set_default("store.connect_timeout", defaults.connect_timeout)?
            .set_default("store.server_selection_timeout", defaults.server_selection_timeout)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "docshell")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DOCSHELL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("store.uri", mongo_uri)?
            .set_override_option("server.port", port)?
            .build()?;

        settings.try_deserialize()
    }

    /// Built-in defaults only, for tests elsewhere in the crate
    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self::layered("/nonexistent/docshell-test-config", None, None)
            .expect("built-in defaults deserialize")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn missing_file() -> String {
        "/nonexistent/docshell-test-config".to_string()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::layered(&missing_file(), None, None).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.store, StoreConfig::default());
        assert!(cfg.logging.access_log);
        assert!(cfg.logging.log_commands);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.performance.backlog, 128);
        assert!(cfg.http.enable_cors);
        assert_eq!(cfg.http.max_body_size, 1_048_576);
    }

    #[test]
    fn test_plain_env_overrides() {
        let cfg = Config::layered(
            &missing_file(),
            Some("mongodb://db.internal:27017".to_string()),
            Some("8080".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.store.uri, "mongodb://db.internal:27017");
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::layered(&missing_file(), None, Some("not-a-port".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_layer_and_override_priority() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docshell.toml");
        fs::write(
            &path,
            r#"
[server]
port = 7000
workers = 2

[store]
database = "Rail"
collection = "Carriages"
uri = "mongodb://from-file:27017"

[logging]
access_log_format = "json"
"#,
        )
        .unwrap();

        let cfg = Config::layered(
            path.to_str().unwrap(),
            Some("mongodb://from-env:27017".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.store.database, "Rail");
        assert_eq!(cfg.store.collection, "Carriages");
        assert_eq!(cfg.store.uri, "mongodb://from-env:27017");
        assert_eq!(cfg.logging.access_log_format, "json");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::layered(&missing_file(), None, None).unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
