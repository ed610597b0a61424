//! Proxy connectivity pre-check.
//!
//! When a proxy is configured, one request goes through it before any
//! probing starts. Failing fast here beats logging a transport error for
//! every single candidate in the batch.

use std::time::Duration;

use anyhow::Context;
use tracing::info;

use probr_common::config::ProxyConfig;

/// Benign, always-up endpoint used purely to exercise the proxy path.
const PRECHECK_URL: &str = "http://www.baidu.com";

pub async fn precheck(proxy: &ProxyConfig, timeout: Duration) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .proxy(reqwest::Proxy::all(proxy.url()).context("invalid proxy address")?)
        .build()
        .context("failed to build proxied client")?;

    client
        .get(PRECHECK_URL)
        .send()
        .await
        .with_context(|| format!("proxy {proxy} failed the connectivity test"))?;

    info!("proxy {} passed the connectivity test", proxy);
    Ok(())
}
