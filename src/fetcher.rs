//! Page retrieval over blocking HTTP

use std::io;

use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::error::FetchError;

/// Blocking HTTP fetcher with a mandatory global timeout.
///
/// One call performs one round trip. Nothing is retried.
#[derive(Debug, Clone)]
pub struct Fetcher {
    agent: ureq::Agent,
    timeout_secs: u64,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(config.timeout()))
                .user_agent(config.user_agent.as_str())
                .max_redirects(config.max_redirects)
                .http_status_as_error(false)
                .build(),
        );

        Self {
            agent,
            timeout_secs: config.timeout_secs,
        }
    }

    /// Fetch `url` and return the body as text when the status is 2xx.
    pub fn fetch(&self, url: &str) -> Result<String, FetchError> {
        url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(url, timeout_secs = self.timeout_secs, "fetching page");

        let resp = self
            .agent
            .get(url)
            .call()
            .map_err(|e| self.classify(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .into_body()
            .read_to_string()
            .map_err(|e| match self.classify(url, e) {
                FetchError::Transport { url, message } => FetchError::Body { url, message },
                other => other,
            })?;

        info!(url, bytes = body.len(), "fetched page");
        Ok(body)
    }

    fn classify(&self, url: &str, err: ureq::Error) -> FetchError {
        let url = url.to_string();
        match err {
            ureq::Error::Timeout(_) => FetchError::Timeout {
                url,
                seconds: self.timeout_secs,
            },
            ureq::Error::Io(e)
                if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) =>
            {
                FetchError::Timeout {
                    url,
                    seconds: self.timeout_secs,
                }
            }
            ureq::Error::StatusCode(status) => FetchError::Status { url, status },
            ureq::Error::BadUri(message) => FetchError::InvalidUrl { url, message },
            other => FetchError::Transport {
                url,
                message: other.to_string(),
            },
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}
