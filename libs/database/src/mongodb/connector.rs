use mongodb::bson::doc;
use mongodb::{Client, options::ClientOptions};
use std::time::Duration;
use tracing::{info, instrument};

use super::MongoConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

/// Build driver options from a `MongoConfig`.
async fn client_options(config: &MongoConfig) -> DatabaseResult<ClientOptions> {
    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    Ok(options)
}

/// Connect and verify the deployment answers a `ping`.
///
/// ```ignore
/// use database::mongodb::{MongoConfig, connect};
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "storefront");
/// let client = connect(&config).await?;
/// ```
#[instrument(skip(config), fields(url = %config.redacted_url(), database = %config.database))]
pub async fn connect(config: &MongoConfig) -> DatabaseResult<Client> {
    info!("Connecting to MongoDB");

    let client = Client::with_options(client_options(config).await?)?;

    client
        .database(&config.database)
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Connected to MongoDB");
    Ok(client)
}

/// Connect with exponential backoff; `None` uses `RetryConfig::default()`.
///
/// Useful during startup when the database may come up after the service.
///
/// ```ignore
/// let retry = RetryConfig::new().with_max_retries(5).with_initial_delay(500);
/// let client = connect_with_retry(&config, Some(retry)).await?;
/// ```
pub async fn connect_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<Client> {
    retry_with_backoff(|| connect(config), retry_config.unwrap_or_default()).await
}

/// Close the connection pool shared by every clone of `client`.
///
/// Waits for in-flight operations; clones used afterwards fail with a
/// shutdown error.
pub async fn disconnect(client: Client) {
    info!("Closing MongoDB connections");
    client.shutdown().await;
    info!("MongoDB connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_options_apply_config() {
        let config = MongoConfig::with_database("mongodb://localhost:27017", "storefront")
            .with_pool_size(7, 2)
            .with_app_name("storefront-api");

        let options = client_options(&config).await.unwrap();
        assert_eq!(options.max_pool_size, Some(7));
        assert_eq!(options.min_pool_size, Some(2));
        assert_eq!(options.app_name.as_deref(), Some("storefront-api"));
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_client_options_rejects_bad_url() {
        let config = MongoConfig::new("not-a-mongo-url");
        assert!(client_options(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_disconnect_closes_idle_client() {
        // Client construction is lazy, so no server is needed for an idle pool
        let client = Client::with_options(
            client_options(&MongoConfig::new("mongodb://localhost:27017"))
                .await
                .unwrap(),
        )
        .unwrap();
        let clone = client.clone();

        tokio::time::timeout(Duration::from_secs(5), disconnect(client))
            .await
            .expect("shutdown of an idle pool completes");
        drop(clone);
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_connect() {
        let url = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let config = MongoConfig::with_database(url, "test");
        assert!(connect(&config).await.is_ok());
    }
}
