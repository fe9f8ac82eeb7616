//! Layered configuration: built-in defaults, an optional `configuration` file
//! in the working directory, then `TODO_`-prefixed environment variables
//! (`TODO_SERVER__PORT=8080`, `TODO_STORAGE__BACKEND=datastore`).

use config::{ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: Backend,
}

/// Which `TodoStore` implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Datastore,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let builder = defaults()?
            .add_source(File::with_name("configuration").required(false))
            .add_source(
                Environment::with_prefix("TODO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        builder.build()?.try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 3000)?
        .set_default("storage.backend", "memory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn defaults_deserialize() {
        let config: Config = defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.server.address(), "127.0.0.1:3000");
        assert_eq!(config.storage.backend, Backend::Memory);
    }

    #[test]
    fn file_overrides_defaults() {
        let toml = r#"
            [server]
            port = 8080

            [storage]
            backend = "datastore"
        "#;
        let config: Config = defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, Backend::Datastore);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result = defaults()
            .unwrap()
            .set_override("storage.backend", "postgres")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Config>();
        assert!(result.is_err());
    }
}
