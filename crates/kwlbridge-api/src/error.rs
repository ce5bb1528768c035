use thiserror::Error;

/// Top-level error type for the `kwlbridge-api` crate.
///
/// Covers every failure mode at the device boundary: authentication,
/// transport, per-page HTTP failures, and page-body parsing.
/// `kwlbridge-core` maps these into its polling/translation policy
/// (re-login, page suppression, warn-and-continue).
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login was rejected by the device (wrong password, etc.)
    #[error("authentication failed (HTTP {status}): {body}")]
    Authentication { status: u16, body: String },

    /// The device answered 401 -- session expired or never established.
    #[error("unauthorized -- re-login required")]
    Unauthorized,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, reset, timeout, ...).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL construction failed (bad host in config).
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Device responses ────────────────────────────────────────────
    /// The requested page does not exist on this firmware (HTTP 404).
    #[error("page {page} not found on device")]
    PageNotFound { page: u8 },

    /// Any other non-2xx device response, with the body for diagnosis.
    #[error("device error (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// A page body did not match the `<ID>`/`<VA>` pair grammar.
    /// Carries the raw body so callers can log it for diagnosis.
    #[error("malformed page body")]
    MalformedPage { body: String },

    /// A variable identifier did not match the `v` + 5 digits pattern.
    #[error("invalid variable identifier: {0:?}")]
    InvalidVarId(String),
}

impl Error {
    /// Returns `true` if this error should trigger a re-login.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if this is a "page not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound { .. })
    }

    /// The response body attached to this error, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Authentication { body, .. }
            | Self::Http { body, .. }
            | Self::MalformedPage { body } => Some(body),
            _ => None,
        }
    }
}
