//! ZoomEye asset-search collaborator.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::CandidateSource;

const SEARCH_URL: &str = "https://api.zoomeye.org/host/search";
const QUERY: &str = r#"app:"Ollama""#;

pub struct ZoomEye {
    key: String,
}

impl ZoomEye {
    pub fn new(key: String) -> Self {
        Self { key }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    matches: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    ip: String,
    #[serde(default)]
    portinfo: Option<PortInfo>,
}

#[derive(Deserialize)]
struct PortInfo {
    port: u16,
}

#[async_trait]
impl CandidateSource for ZoomEye {
    fn name(&self) -> &'static str {
        "zoomeye"
    }

    async fn fetch(&self, client: &reqwest::Client) -> anyhow::Result<Vec<String>> {
        let envelope: Envelope = client
            .get(SEARCH_URL)
            .header("API-KEY", &self.key)
            .query(&[("query", QUERY), ("page", "1")])
            .send()
            .await
            .context("zoomeye search request failed")?
            .json()
            .await
            .context("zoomeye answered with an unexpected payload")?;

        Ok(envelope
            .matches
            .into_iter()
            .map(|entry| match entry.portinfo {
                Some(portinfo) => format!("{}:{}", entry.ip, portinfo.port),
                None => entry.ip,
            })
            .collect())
    }
}
