use std::time::Duration;

use url::Url;

use crate::StreamError;

/// Delay schedule between reconnection attempts.
///
/// `multiplier == 1` gives the fixed delay the backend protocol expects;
/// larger values back off exponentially up to `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    /// Consecutive failed attempts allowed before giving up.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
            multiplier: 1,
            max_delay: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the 1-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .saturating_pow(attempt.saturating_sub(1));
        self.delay.saturating_mul(factor).min(self.max_delay.max(self.delay))
    }

    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub url: String,
    /// Sent as `Authorization: Bearer …` on the handshake when present.
    pub bearer_token: Option<String>,
    pub connect_timeout: Duration,
    pub reconnect: ReconnectPolicy,
    /// Recycle an open connection that stays silent this long.
    pub idle_timeout: Option<Duration>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000/ws".to_string(),
            bearer_token: None,
            connect_timeout: Duration::from_secs(10),
            reconnect: ReconnectPolicy::default(),
            idle_timeout: None,
        }
    }
}

impl StreamSettings {
    pub fn validate(&self) -> Result<Url, StreamError> {
        let url = Url::parse(&self.url).map_err(|err| StreamError::InvalidUrl(err.to_string()))?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(StreamError::InvalidUrl(format!(
                "unsupported scheme {other}"
            ))),
        }
    }
}
