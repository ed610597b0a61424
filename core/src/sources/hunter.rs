//! Hunter (Qianxin) asset-search collaborator.

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde::Deserialize;

use super::CandidateSource;

const SEARCH_URL: &str = "https://hunter.qianxin.com/openApi/search";
const QUERY: &str = r#"app.name="Ollama""#;
const PAGE_SIZE: usize = 100;

pub struct Hunter {
    key: String,
}

impl Hunter {
    pub fn new(key: String) -> Self {
        Self { key }
    }
}

#[derive(Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Data>,
}

#[derive(Deserialize)]
struct Data {
    #[serde(default)]
    arr: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    url: String,
}

#[async_trait]
impl CandidateSource for Hunter {
    fn name(&self) -> &'static str {
        "hunter"
    }

    async fn fetch(&self, client: &reqwest::Client) -> anyhow::Result<Vec<String>> {
        // Hunter wants the query in URL-safe base64, unlike FOFA
        let search = URL_SAFE.encode(QUERY);
        let page_size = PAGE_SIZE.to_string();
        let envelope: Envelope = client
            .get(SEARCH_URL)
            .query(&[
                ("api-key", self.key.as_str()),
                ("search", search.as_str()),
                ("page", "1"),
                ("page_size", page_size.as_str()),
            ])
            .send()
            .await
            .context("hunter search request failed")?
            .json()
            .await
            .context("hunter answered with an unexpected payload")?;

        if envelope.code != 200 {
            anyhow::bail!(
                "hunter rejected the query (code {}): {}",
                envelope.code,
                envelope.message.unwrap_or_else(|| "no detail".to_string())
            );
        }

        let entries = envelope.data.map(|d| d.arr).unwrap_or_default();
        Ok(entries.into_iter().map(|e| e.url).collect())
    }
}
