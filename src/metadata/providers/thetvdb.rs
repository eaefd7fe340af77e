//! TheTVDB series source.
//!
//! Implements [`SeriesSource`] against TheTVDB's XML API:
//!
//! - `GET {base}/api/GetSeries.php?language=all&seriesname={name}` to find a
//!   series id.
//! - `GET {base}/api/{api_key}/series/{id}/all/{lang}.zip` to download the
//!   full series package.
//!
//! Features:
//! - Token-bucket rate limiting via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support.
//! - Configurable request timeout.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::TheTvdbConfig;
use crate::metadata::package::parse_search_response;
use crate::metadata::provider::SeriesSource;

/// Public TheTVDB endpoint.
pub const DEFAULT_BASE_URL: &str = "https://thetvdb.com/";

/// TheTVDB API client.
///
/// # Examples
///
/// ```no_run
/// use showforged::config::TheTvdbConfig;
/// use showforged::metadata::providers::ThetvdbClient;
///
/// let config = TheTvdbConfig {
///     api_key: "your-api-key".into(),
///     ..Default::default()
/// };
/// let client = ThetvdbClient::new(&config).unwrap();
/// ```
pub struct ThetvdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl ThetvdbClient {
    pub fn new(config: &TheTvdbConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            rate_limiter,
        })
    }

    /// Execute a GET request with rate limiting and 429-retry logic.
    async fn get(&self, url: &str) -> anyhow::Result<reqwest::Response> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("TheTVDB request failed: {}", self.redact(url)))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < self.max_retries {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "TheTVDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            let resp = resp
                .error_for_status()
                .with_context(|| format!("TheTVDB request returned error: {}", self.redact(url)))?;

            return Ok(resp);
        }
    }

    fn search_url(&self, name: &str) -> String {
        format!(
            "{}/api/GetSeries.php?language=all&seriesname={}",
            self.base_url,
            urlencoded(name)
        )
    }

    fn package_url(&self, series_id: &str, language: &str) -> String {
        format!(
            "{}/api/{}/series/{}/all/{}.zip",
            self.base_url,
            self.api_key,
            urlencoded(series_id),
            urlencoded(language)
        )
    }

    /// Strip the API key from a URL before it is logged.
    fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            url.to_string()
        } else {
            url.replace(&self.api_key, "<api-key>")
        }
    }
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

#[async_trait]
impl SeriesSource for ThetvdbClient {
    fn name(&self) -> &'static str {
        "thetvdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search_series(&self, name: &str) -> anyhow::Result<Option<String>> {
        let url = self.search_url(name);
        debug!(url = %url, "TheTVDB search series");

        let body = self
            .get(&url)
            .await?
            .text()
            .await
            .context("failed to read TheTVDB search response")?;

        parse_search_response(&body).context("failed to parse TheTVDB search response")
    }

    async fn fetch_series_package(&self, series_id: &str, language: &str) -> anyhow::Result<Bytes> {
        let url = self.package_url(series_id, language);
        debug!(url = %self.redact(&url), "TheTVDB fetch series package");

        self.get(&url)
            .await?
            .bytes()
            .await
            .with_context(|| format!("failed to download package for series {series_id}"))
    }
}
