// Bridge configuration
//
// Carries everything the engine needs: device address, credential, poll
// interval, the recurring-poll page subset, and the timing constants for
// the debounced timers. Timing lives here (rather than as hardcoded
// values in the loop) so tests can compress it.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use kwlbridge_api::TransportConfig;

use crate::error::CoreError;

/// All known page identifiers; polled at startup and after write-backs.
pub const COMPLETE_PAGES: [u8; 17] =
    [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17];

/// Default subset for the recurring poll: the pages whose values change
/// often. Trades completeness for responsiveness on the embedded server.
pub const DEFAULT_UPDATE_PAGES: [u8; 5] = [3, 4, 8, 12, 16];

/// Floor for the recurring poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Timer periods and delays used by the engine.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Fixed delay before every page request; the device's embedded HTTP
    /// server cannot tolerate rapid-fire or overlapping connections.
    pub page_delay: Duration,
    /// Debounced one-shot re-login delay after a 401 mid-poll.
    pub relogin_delay: Duration,
    /// Debounced one-shot delay before the confirmatory poll after a
    /// write-back.
    pub confirm_delay: Duration,
    /// Proactive session refresh period.
    pub refresh_login_period: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(500),
            relogin_delay: Duration::from_secs(30),
            confirm_delay: Duration::from_secs(10),
            refresh_login_period: Duration::from_secs(5 * 60),
        }
    }
}

/// Configuration for one bridge instance (one device).
#[derive(Clone)]
pub struct BridgeConfig {
    /// Device address: IP or hostname, no scheme.
    pub host: String,
    pub password: SecretString,
    /// Recurring poll interval; floor-clamped to [`MIN_POLL_INTERVAL`].
    pub poll_interval: Duration,
    /// Override for the recurring-poll page list.
    pub update_pages: Option<Vec<u8>>,
    pub transport: TransportConfig,
    pub timing: Timing,
}

impl BridgeConfig {
    pub fn new(host: impl Into<String>, password: SecretString) -> Self {
        Self {
            host: host.into(),
            password,
            poll_interval: Duration::from_secs(30),
            update_pages: None,
            transport: TransportConfig::default(),
            timing: Timing::default(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(CoreError::Config("device host is not set".into()));
        }
        if self.password.expose_secret().is_empty() {
            return Err(CoreError::Config("device password is not set".into()));
        }
        Ok(())
    }

    /// Poll interval with the floor applied.
    pub(crate) fn effective_poll_interval(&self) -> Duration {
        if self.poll_interval < MIN_POLL_INTERVAL {
            tracing::info!(
                "poll interval below minimum, raising to {:?}",
                MIN_POLL_INTERVAL
            );
            MIN_POLL_INTERVAL
        } else {
            self.poll_interval
        }
    }

    pub(crate) fn effective_update_pages(&self) -> Vec<u8> {
        self.update_pages
            .clone()
            .unwrap_or_else(|| DEFAULT_UPDATE_PAGES.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BridgeConfig {
        BridgeConfig::new("192.168.1.50", "pw".to_string().into())
    }

    #[test]
    fn validate_rejects_missing_host_or_password() {
        let mut cfg = config();
        cfg.host = String::new();
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.password = String::new().into();
        assert!(cfg.validate().is_err());

        assert!(config().validate().is_ok());
    }

    #[test]
    fn poll_interval_is_floor_clamped() {
        let mut cfg = config();
        cfg.poll_interval = Duration::from_millis(10);
        assert_eq!(cfg.effective_poll_interval(), MIN_POLL_INTERVAL);

        cfg.poll_interval = Duration::from_secs(60);
        assert_eq!(cfg.effective_poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn update_pages_default_and_override() {
        let mut cfg = config();
        assert_eq!(cfg.effective_update_pages(), DEFAULT_UPDATE_PAGES.to_vec());

        cfg.update_pages = Some(vec![1, 2]);
        assert_eq!(cfg.effective_update_pages(), vec![1, 2]);
    }
}
