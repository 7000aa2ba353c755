//! Rate sources
//!
//! A failed or implausible fetch is an error; the caller skips that round
//! rather than submitting a placeholder, since the registry stores whatever
//! it is sent.

use crate::config::SourceConfig;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no value at {0}")]
    MissingField(String),

    #[error("value at {0} is not a number")]
    NotANumber(String),

    #[error("implausible rate {0}")]
    InvalidRate(f64),
}

/// Fetches one price from a JSON HTTP endpoint
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
    json_pointer: String,
    scale: u64,
}

impl HttpRateSource {
    pub fn new(config: &SourceConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            json_pointer: config.json_pointer.clone(),
            scale: config.scale,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<u64, FeedError> {
        let body: Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        extract_rate(&body, &self.json_pointer, self.scale)
    }
}

/// Pull the price at `pointer` out of `body` and scale it to an integer rate.
///
/// Accepts JSON numbers and numeric strings (several exchanges quote prices
/// as strings).
pub fn extract_rate(body: &Value, pointer: &str, scale: u64) -> Result<u64, FeedError> {
    let value = body
        .pointer(pointer)
        .ok_or_else(|| FeedError::MissingField(pointer.to_string()))?;

    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FeedError::NotANumber(pointer.to_string()))?;

    let scaled = (price * scale as f64).round();
    if !scaled.is_finite() || scaled < 1.0 || scaled >= u64::MAX as f64 {
        return Err(FeedError::InvalidRate(price));
    }
    Ok(scaled as u64)
}
