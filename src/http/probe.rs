/// Health probe for a running HTTP server
///
/// Used by the `check-health` subcommand in deployment scripts.

use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

const PROBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll a `/health` URL until it answers 200 or the retries run out
///
/// Returns whether the server reported healthy.
pub async fn check_health(url: &str, retries: u32, delay: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(PROBE_REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Could not build HTTP client: {}", e);
            return false;
        }
    };

    let attempts = retries.max(1);
    info!("Checking server health at: {}", url);

    for attempt in 1..=attempts {
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                let body: Value = response.json().await.unwrap_or(Value::Null);
                info!(
                    "Server is healthy (status: {}, version: {})",
                    body.get("status").and_then(|v| v.as_str()).unwrap_or("unknown"),
                    body.get("version").and_then(|v| v.as_str()).unwrap_or("unknown"),
                );
                return true;
            }
            Ok(response) => {
                warn!("Server returned status code: {}", response.status());
            }
            Err(e) => {
                warn!("Connection error (attempt {}/{}): {}", attempt, attempts, e);
            }
        }

        if attempt < attempts {
            info!("Retrying in {} seconds...", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
    }

    warn!("Server health check failed after {} attempts", attempts);
    false
}
