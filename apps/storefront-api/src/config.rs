//! Configuration for the Storefront API

use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::RetryConfig;
use database::mongodb::MongoConfig;
use domain_products::QueryConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    /// Listing defaults: search threshold and page sizes
    pub catalog: QueryConfig,
    /// Backoff for catalog reads that hit a transient store failure
    pub retry: RetryConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        let catalog = QueryConfig::from_env()?;
        let retry = RetryConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            jwt,
            catalog,
            retry,
        })
    }
}
