use mongodb::Client;
use mongodb::bson::doc;
use serde::Serialize;
use std::time::Instant;

/// Result of a MongoDB ping
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error details when unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
}

/// Ping the `admin` database and report latency and any error.
///
/// ```ignore
/// let status = check_health_detailed(&client).await;
/// if !status.healthy {
///     tracing::warn!(message = ?status.message, "MongoDB unhealthy");
/// }
/// ```
pub async fn check_health_detailed(client: &Client) -> HealthStatus {
    let start = Instant::now();
    let result = client.database("admin").run_command(doc! { "ping": 1 }).await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms,
        },
    }
}
