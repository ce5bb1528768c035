// Device HTTP client
//
// Wraps `reqwest::Client` with the easyControls request shapes: every
// operation is a form-encoded POST, and the firmware signals state with
// plain HTTP status codes (401 = session gone, 404 = page not in this
// firmware). Status classification happens here, in one place, so the
// poller upstream can branch on typed errors instead of raw codes.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Form field the firmware reads the login password from.
const LOGIN_FIELD: &str = "v00402";

/// Raw HTTP client for one easyControls device.
///
/// The session is bound to the requesting IP on the device side, so there
/// is no token to carry -- a successful [`login`](Self::login) simply arms
/// the device to answer subsequent page fetches until the session lapses.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceClient {
    /// Create a client for the device at `host` (IP or hostname, no scheme).
    pub fn new(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client(host)?;
        let base_url = Url::parse(&format!("http://{host}/"))?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests to point at a mock server.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Authenticate with the device.
    ///
    /// `POST /info.htm` with the password in the fixed login form field.
    /// Success is any 2xx response; the device keeps the session alive for
    /// a few minutes afterwards, so callers refresh proactively.
    pub async fn login(&self, password: &SecretString) -> Result<(), Error> {
        let url = self.base_url.join("info.htm")?;
        debug!("logging in at {}", url);

        let resp = self
            .http
            .post(url)
            .body(format!("{LOGIN_FIELD}={}", password.expose_secret()))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        debug!(body = %body, "login successful");
        Ok(())
    }

    /// Fetch page `page`'s raw XML body.
    ///
    /// `POST /data/werte<N>.xml` with the resource path echoed in the form
    /// body -- the firmware's own web UI does the same.
    pub async fn fetch_page(&self, page: u8) -> Result<String, Error> {
        let resource = format!("data/werte{page}.xml");
        let url = self.base_url.join(&resource)?;
        debug!("fetching page {} at {}", page, url);

        let resp = self
            .http
            .post(url)
            .body(format!("xml=/{resource}"))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::PageNotFound { page });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        resp.text().await.map_err(Error::Transport)
    }

    /// Write a raw device variable: `POST /info.htm` with `<var>=<value>`.
    ///
    /// The device gives no structured acknowledgment -- callers re-poll to
    /// observe the value it actually applied.
    pub async fn write_var(&self, variable: &str, value: &str) -> Result<(), Error> {
        let url = self.base_url.join("info.htm")?;
        debug!("writing {}={} at {}", variable, value, url);

        let resp = self
            .http
            .post(url)
            .body(format!("{variable}={value}"))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!("write accepted");
        Ok(())
    }
}
