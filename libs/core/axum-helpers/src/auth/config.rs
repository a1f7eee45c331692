//! JWT verification settings.

use core_config::{ConfigError, FromEnv, env_parse, env_required};

/// Minimum accepted length for an HS256 secret.
pub const MIN_SECRET_LEN: usize = 32;

/// JWT verification configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - at least 32 characters
/// - `JWT_ISSUER` (optional) - expected `iss` claim
/// - `JWT_AUDIENCE` (optional) - expected `aud` claim
/// - `JWT_LEEWAY_SECS` (default: 30) - clock skew tolerance for `exp`
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_secs: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            issuer: None,
            audience: None,
            leeway_secs: 30,
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::InvalidValue {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(env_required("JWT_SECRET")?)?;
        config.issuer = std::env::var("JWT_ISSUER").ok();
        config.audience = std::env::var("JWT_AUDIENCE").ok();
        config.leeway_secs = env_parse("JWT_LEEWAY_SECS", config.leeway_secs)?;
        Ok(config)
    }
}
