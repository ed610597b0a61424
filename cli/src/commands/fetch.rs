use std::fs;

use anyhow::Context;
use tracing::{info, warn};

use probr_common::{config::Config, target::Provider};
use probr_core::sources;

/// Downloads candidates from an asset-search provider into a plain-text
/// file the scan path can consume. Keys and pagination stay in here.
pub async fn fetch(provider: Provider, key: String, cfg: &Config) -> anyhow::Result<()> {
    let source = sources::for_provider(provider, key);

    let mut builder = reqwest::Client::builder().timeout(cfg.timeout);
    if let Some(proxy) = &cfg.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy.url()).context("invalid proxy address")?);
    }
    let client = builder.build().context("failed to build HTTP client")?;

    info!("querying {} for exposed instances", source.name());
    let candidates = source.fetch(&client).await?;

    if candidates.is_empty() {
        warn!("{} returned no candidates", source.name());
        return Ok(());
    }

    let path = format!("targets-{}.txt", source.name());
    fs::write(&path, candidates.join("\n") + "\n")
        .with_context(|| format!("failed to write {path}"))?;

    info!(
        "wrote {} candidates to {} (scan them with 'probr scan {}')",
        candidates.len(),
        path,
        path
    );
    Ok(())
}
