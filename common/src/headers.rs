//! Request header assembly.
//!
//! Every request carries a User-Agent drawn uniformly from a fixed browser
//! pool, optionally overlaid with a user-supplied override map. Overrides
//! win on key collision.

use std::collections::BTreeMap;

use rand::seq::IndexedRandom;

/// Pool of plausible browser agents. One is picked per run, not per request.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.129 Safari/537.36,Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/27.0.1453.93 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.129 Safari/537.36,Mozilla/5.0 (Windows NT 6.2; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/30.0.1599.17 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.129 Safari/537.36,Mozilla/5.0 (X11; NetBSD) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/27.0.1453.116 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.2; WOW64) AppleWebKit/537.36 (KHTML like Gecko) Chrome/44.0.2403.155 Safari/537.36",
    "Mozilla/5.0 (Windows; U; Windows NT 6.1; en-US) AppleWebKit/533.20.25 (KHTML, like Gecko) Version/5.0.4 Safari/533.20.27",
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:23.0) Gecko/20130406 Firefox/23.0",
    "Opera/9.80 (Windows NT 5.1; U; zh-sg) Presto/2.9.181 Version/12.00",
];

/// The merged header map sent with every request of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: BTreeMap<String, String>,
}

impl HeaderSet {
    /// Starts a header set with a randomly chosen User-Agent from the pool.
    pub fn with_random_agent() -> Self {
        let agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        Self::with_agent(agent)
    }

    pub fn with_agent(agent: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), agent.to_string());
        Self { headers }
    }

    /// Overlays user-supplied overrides; override values win on collision.
    pub fn merge(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (name, value) in overrides {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Parses a header-override file body: a JSON object of name→value pairs.
pub fn parse_overrides(body: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let overrides: BTreeMap<String, String> = serde_json::from_str(body)?;
    Ok(overrides)
}
