use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use scope_core::config::SourceConfig;
use scope_core::MatchRecord;

use super::{parse_matches_payload, IngestionStatus, MatchSource, SourceError};

/// Match source backed by the storage service's HTTP endpoints.
pub struct HttpMatchSource {
    client: reqwest::Client,
    matches_url: String,
    status_url: Option<String>,
    retries: u32,
    backoff: Duration,
}

impl HttpMatchSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let matches_url = config
            .url
            .clone()
            .ok_or_else(|| SourceError::NotConfigured("MATCH_SOURCE_URL not set".into()))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            matches_url,
            status_url: config.status_url.clone(),
            retries: config.retries,
            backoff: config.backoff(),
        })
    }

    /// Ask the storage side whether ingestion for this player has finished.
    async fn ingestion_status(&self, player_id: &str) -> Result<IngestionStatus, SourceError> {
        let Some(url) = &self.status_url else {
            return Ok(IngestionStatus::Ready);
        };
        let resp = self.post_with_retry(url, json!({ "puuid": player_id })).await?;
        let raw = resp["lastMatches"]
            .as_str()
            .or_else(|| resp["status"].as_str())
            .or_else(|| resp["profile"]["lastMatches"].as_str())
            .unwrap_or("UNKNOWN");
        Ok(IngestionStatus::parse(raw))
    }

    /// POST a JSON body, retrying transport failures and 5xx responses with linear backoff.
    async fn post_with_retry(&self, url: &str, body: Value) -> Result<Value, SourceError> {
        let mut attempt = 0u32;
        loop {
            match self.post_once(url, &body).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retries && is_retryable(&e) => {
                    attempt += 1;
                    let delay = backoff_for(self.backoff, attempt);
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "match source request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once(&self, url: &str, body: &Value) -> Result<Value, SourceError> {
        debug!("Match source request to {}", url);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MatchSource for HttpMatchSource {
    async fn fetch_recent(
        &self,
        player_id: &str,
        count: usize,
    ) -> Result<Vec<MatchRecord>, SourceError> {
        let status = self.ingestion_status(player_id).await?;
        if status != IngestionStatus::Ready {
            return Err(SourceError::NotReady(status));
        }

        let payload = self
            .post_with_retry(&self.matches_url, json!({ "puuid": player_id, "count": count }))
            .await?;
        let mut matches = parse_matches_payload(payload)?;
        matches.truncate(count);

        info!(matches = matches.len(), "fetched match history");
        Ok(matches)
    }
}

fn is_retryable(err: &SourceError) -> bool {
    match err {
        SourceError::Http(_) => true,
        SourceError::Api { status, .. } => *status >= 500,
        _ => false,
    }
}

fn backoff_for(base: Duration, attempt: u32) -> Duration {
    base * attempt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff_for(base, 1), Duration::from_millis(250));
        assert_eq!(backoff_for(base, 3), Duration::from_millis(750));
    }

    #[test]
    fn only_transport_and_server_errors_retry() {
        assert!(is_retryable(&SourceError::Api { status: 503, body: String::new() }));
        assert!(!is_retryable(&SourceError::Api { status: 404, body: String::new() }));
        assert!(!is_retryable(&SourceError::NotReady(IngestionStatus::Fetching)));
        assert!(!is_retryable(&SourceError::Parse("bad".into())));
    }

    #[test]
    fn missing_url_is_a_configuration_error() {
        let config = SourceConfig {
            url: None,
            status_url: None,
            timeout_secs: 1,
            retries: 0,
            backoff_ms: 0,
            window: 20,
        };
        assert!(matches!(
            HttpMatchSource::new(&config),
            Err(SourceError::NotConfigured(_))
        ));
    }
}
