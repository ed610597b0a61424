//! FOFA asset-search collaborator.

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use super::CandidateSource;

const SEARCH_URL: &str = "https://fofa.info/api/v1/search/all";
const QUERY: &str = r#"app="Ollama""#;
const PAGE_SIZE: usize = 100;

pub struct Fofa {
    key: String,
}

impl Fofa {
    pub fn new(key: String) -> Self {
        Self { key }
    }
}

#[derive(Deserialize)]
struct Envelope {
    error: bool,
    #[serde(default)]
    errmsg: Option<String>,
    #[serde(default)]
    results: Vec<String>,
}

#[async_trait]
impl CandidateSource for Fofa {
    fn name(&self) -> &'static str {
        "fofa"
    }

    async fn fetch(&self, client: &reqwest::Client) -> anyhow::Result<Vec<String>> {
        let qbase64 = STANDARD.encode(QUERY);
        let size = PAGE_SIZE.to_string();
        let envelope: Envelope = client
            .get(SEARCH_URL)
            .query(&[
                ("key", self.key.as_str()),
                ("qbase64", qbase64.as_str()),
                ("fields", "host"),
                ("size", size.as_str()),
            ])
            .send()
            .await
            .context("fofa search request failed")?
            .json()
            .await
            .context("fofa answered with an unexpected payload")?;

        if envelope.error {
            anyhow::bail!(
                "fofa rejected the query: {}",
                envelope.errmsg.unwrap_or_else(|| "no detail".to_string())
            );
        }

        Ok(envelope.results)
    }
}
