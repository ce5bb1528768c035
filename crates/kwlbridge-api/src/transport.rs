// Shared transport configuration for building reqwest::Client instances.
//
// The easyControls firmware serves plain HTTP from a small embedded stack
// and is picky about headers: it expects a browser-ish request (Referer to
// its own root, text/plain content type) and benefits from keep-alive so
// the bridge reuses a single connection instead of churning sockets.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::error::Error;

/// Shared transport configuration for the device HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// How long an idle keep-alive connection is retained in the pool.
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` for the device at `host`.
    ///
    /// The default header set is fixed at construction and sent on every
    /// request; the Referer points at the device's own web root, which the
    /// firmware checks on form posts.
    pub fn build_client(&self, host: &str) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("*/*"));
        headers.insert(
            "Accept-Language",
            HeaderValue::from_static("de,en-US;q=0.7,en;q=0.3"),
        );
        headers.insert(
            "Content-Type",
            HeaderValue::from_static("text/plain;charset=UTF-8"),
        );
        let referer = format!("http://{host}/");
        headers.insert(
            "Referer",
            HeaderValue::from_str(&referer).map_err(|_| {
                Error::InvalidUrl(url::ParseError::InvalidDomainCharacter)
            })?,
        );
        headers.insert("DNT", HeaderValue::from_static("1"));

        reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/86.0.4240.193 Safari/537.36",
            )
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}
