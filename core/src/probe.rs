//! # Service Fingerprinting
//!
//! Issues a single GET against a normalized endpoint and classifies the
//! response. An Ollama daemon answers its root path with a plain-text
//! `"Ollama is running"` body, so the fingerprint is the presence of both
//! marker tokens. A positive match triggers one best-effort follow-up to
//! `api/version`.
//!
//! The target population runs self-signed or absent certificates almost
//! universally, so certificate verification is disabled for every request
//! this module sends.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use probr_common::config::ProxyConfig;
use probr_common::headers::HeaderSet;

/// Marker token naming the target service.
pub const MARKER_NAME: &str = "Ollama";
/// Marker token present in the service's liveness banner.
pub const MARKER_STATE: &str = "running";

/// Classification of one probed endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Fingerprint matched. `version` is absent when the secondary
    /// `api/version` request failed; the match still stands.
    Confirmed {
        endpoint: String,
        content_length: usize,
        version: Option<String>,
    },
    /// Endpoint answered, fingerprint did not match.
    Rejected { endpoint: String, status: u16 },
    /// Transport-level failure (DNS, refused connection, timeout).
    Errored { endpoint: String, cause: String },
}

impl ProbeOutcome {
    pub fn endpoint(&self) -> &str {
        match self {
            ProbeOutcome::Confirmed { endpoint, .. }
            | ProbeOutcome::Rejected { endpoint, .. }
            | ProbeOutcome::Errored { endpoint, .. } => endpoint,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    /// A 503 is read as the target actively refusing further contact.
    /// Fatal to the entire run, not just this endpoint.
    #[error("{endpoint} answered 503 Service Unavailable, stopping the run")]
    CircuitBreak { endpoint: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid header '{name}': {detail}")]
    InvalidHeader { name: String, detail: String },
}

#[derive(Deserialize)]
struct VersionPayload {
    version: String,
}

/// Fingerprints endpoints with one preconfigured client.
pub struct ServiceProbe {
    client: reqwest::Client,
}

impl ServiceProbe {
    /// Builds the client used for every probe of a run: merged headers,
    /// per-request timeout, optional uniform proxy, no TLS verification.
    pub fn new(
        headers: &HeaderSet,
        timeout: Duration,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Self, ProbeError> {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (name, value) in headers.iter() {
            let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProbeError::InvalidHeader {
                    name: name.to_string(),
                    detail: e.to_string(),
                })?;
            let header_value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
                ProbeError::InvalidHeader {
                    name: name.to_string(),
                    detail: e.to_string(),
                }
            })?;
            header_map.insert(header_name, header_value);
        }

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .default_headers(header_map);

        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.url()).map_err(ProbeError::Client)?);
        }

        let client = builder.build().map_err(ProbeError::Client)?;
        Ok(Self { client })
    }

    /// Classifies one endpoint. `endpoint` must already be normalized
    /// (explicit scheme, trailing slash).
    pub async fn probe(&self, endpoint: &str) -> Result<ProbeOutcome, ProbeError> {
        let response = match self.client.get(endpoint).send().await {
            Ok(response) => response,
            Err(e) => {
                return Ok(ProbeOutcome::Errored {
                    endpoint: endpoint.to_string(),
                    cause: e.to_string(),
                });
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(ProbeError::CircuitBreak {
                endpoint: endpoint.to_string(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Ok(ProbeOutcome::Errored {
                    endpoint: endpoint.to_string(),
                    cause: e.to_string(),
                });
            }
        };

        if body.contains(MARKER_NAME) && body.contains(MARKER_STATE) {
            let version = self.fetch_version(endpoint).await;
            return Ok(ProbeOutcome::Confirmed {
                endpoint: endpoint.to_string(),
                content_length: body.len(),
                version,
            });
        }

        debug!("{} answered {} without the fingerprint", endpoint, status);
        Ok(ProbeOutcome::Rejected {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }

    /// Secondary version lookup. A miss never downgrades a confirmed match.
    async fn fetch_version(&self, endpoint: &str) -> Option<String> {
        let url = format!("{endpoint}api/version");
        let result = async {
            let response = self.client.get(&url).send().await?;
            response.json::<VersionPayload>().await
        }
        .await;

        match result {
            Ok(payload) => Some(payload.version),
            Err(e) => {
                warn!("version lookup against {} failed: {}", url, e);
                None
            }
        }
    }

    /// Access to the run's shared client for the thin collaborators
    /// (proxy pre-check, interactive shell).
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
