//! HTTP transport shared by the provider adapters
//!
//! One JSON POST with bounded retry: connect/timeout failures, HTTP 429 and
//! 5xx responses are retried with exponential backoff; everything else is
//! surfaced immediately. The retry budget is small and fixed, so a dead
//! endpoint fails the round in seconds rather than hanging the REPL.

use std::time::Duration;

use serde_json::Value;
use synapse_application::ports::chat_provider::ProviderError;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// POST `body` as JSON and parse the JSON response.
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &Value,
    ) -> Result<Value, ProviderError> {
        let mut attempt = 0u32;
        loop {
            let mut request = self.client.post(url).json(body);
            for (name, value) in headers {
                request = request.header(*name, value);
            }

            match request.send().await {
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < MAX_RETRIES => {
                    let delay = backoff(attempt);
                    warn!(url, attempt, ?delay, "transport failure, retrying: {e}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(ProviderError::Transport(e.to_string())),
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(url, %status, "provider request ok");
                        return response
                            .json::<Value>()
                            .await
                            .map_err(|e| ProviderError::Protocol(e.to_string()));
                    }

                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if retryable && attempt < MAX_RETRIES {
                        let delay = backoff(attempt);
                        warn!(url, %status, attempt, ?delay, "retryable status, backing off");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let message = response.text().await.unwrap_or_default();
                    return Err(ProviderError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
            }
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn backoff(attempt: u32) -> Duration {
    BASE_DELAY * 2u32.saturating_pow(attempt)
}
