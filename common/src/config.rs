use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Per-run knobs, built once from the command line and passed by reference.
pub struct Config {
    /// Pause before each probe, so targets are not hammered.
    pub delay: Duration,
    /// Per-request network timeout. A hung target is bounded only by this.
    pub timeout: Duration,
    /// Optional HTTP proxy applied uniformly to every request.
    pub proxy: Option<ProxyConfig>,
    /// Suppresses the startup banner.
    pub no_banner: bool,
}

/// A `host:port` pair routing all outbound requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    /// The proxy as a URL reqwest accepts.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProxyParseError {
    #[error("proxy must be given as host:port, got '{0}'")]
    MissingPort(String),
    #[error("invalid proxy port '{0}'")]
    InvalidPort(String),
}

impl FromStr for ProxyConfig {
    type Err = ProxyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((host, port_str)) = s.rsplit_once(':') else {
            return Err(ProxyParseError::MissingPort(s.to_string()));
        };

        if host.is_empty() {
            return Err(ProxyParseError::MissingPort(s.to_string()));
        }

        let port = port_str
            .parse::<u16>()
            .map_err(|_| ProxyParseError::InvalidPort(port_str.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}
