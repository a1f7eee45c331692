use crate::{env_list, env_or_default, env_parse, ConfigError, FromEnv};
use std::net::Ipv4Addr;

/// Server configuration for HTTP APIs
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer
    pub cors_allowed_origins: Vec<String>,
    /// Upper bound on the cleanup phase after a shutdown signal
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            ..Self::default()
        }
    }

    pub fn with_cors_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromEnv for ServerConfig {
    /// Reads from environment variables:
    /// - HOST: defaults to Ipv4Addr::UNSPECIFIED (0.0.0.0 - all interfaces)
    /// - PORT: defaults to 8080
    /// - CORS_ALLOWED_ORIGIN: required, comma-separated
    /// - SHUTDOWN_TIMEOUT_SECS: defaults to 30
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string());
        let port = env_parse("PORT", 8080u16)?;
        let shutdown_timeout_secs = env_parse("SHUTDOWN_TIMEOUT_SECS", 30u64)?;

        let cors_allowed_origins = env_list("CORS_ALLOWED_ORIGIN")
            .ok_or_else(|| ConfigError::MissingEnvVar("CORS_ALLOWED_ORIGIN".to_string()))?;
        if cors_allowed_origins.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "CORS_ALLOWED_ORIGIN".to_string(),
                details: "at least one origin is required".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            shutdown_timeout_secs,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: 8080,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            shutdown_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_env_with_defaults() {
        temp_env::with_vars(
            [
                ("HOST", None::<&str>),
                ("PORT", None::<&str>),
                ("SHUTDOWN_TIMEOUT_SECS", None::<&str>),
                ("CORS_ALLOWED_ORIGIN", Some("http://localhost:5173")),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.address(), "0.0.0.0:8080");
                assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
                assert_eq!(config.shutdown_timeout_secs, 30);
            },
        );
    }

    #[test]
    fn test_server_config_from_env_with_custom_values() {
        temp_env::with_vars(
            [
                ("HOST", Some("127.0.0.1")),
                ("PORT", Some("3000")),
                (
                    "CORS_ALLOWED_ORIGIN",
                    Some("http://localhost:3000, https://shop.example.com"),
                ),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.address(), "127.0.0.1:3000");
                assert_eq!(config.cors_allowed_origins.len(), 2);
                assert_eq!(config.cors_allowed_origins[1], "https://shop.example.com");
            },
        );
    }

    #[test]
    fn test_server_config_requires_cors_origin() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("CORS_ALLOWED_ORIGIN"));
        });
    }

    #[test]
    fn test_server_config_rejects_blank_cors_origin() {
        temp_env::with_var("CORS_ALLOWED_ORIGIN", Some(" , "), || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        });
    }

    #[test]
    fn test_server_config_from_env_port_out_of_range() {
        temp_env::with_vars(
            [
                ("PORT", Some("99999")),
                ("CORS_ALLOWED_ORIGIN", Some("http://localhost:3000")),
            ],
            || {
                let err = ServerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("PORT"));
            },
        );
    }

    #[test]
    fn test_server_config_new_keeps_defaults() {
        let config = ServerConfig::new("localhost".to_string(), 9000)
            .with_cors_origins(["https://shop.example.com"]);
        assert_eq!(config.address(), "localhost:9000");
        assert_eq!(config.cors_allowed_origins, vec!["https://shop.example.com"]);
        assert_eq!(config.shutdown_timeout_secs, 30);
    }
}
