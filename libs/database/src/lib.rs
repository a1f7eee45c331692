//! Database connectors and resilience utilities.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, configuration and health checks
//! - `config` - `core_config::FromEnv` implementations for the config structs
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "storefront");
//! let client = connect_with_retry(&config, None).await?;
//! let products = client.database(config.database()).collection::<Document>("products");
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult, RetryConfig, retry_if, retry_with_backoff};
