use std::path::Path;

use tracing::{error, info, warn};

use probr_common::{config::Config, headers::HeaderSet, target};
use probr_core::probe::{ProbeError, ProbeOutcome, ServiceProbe};
use probr_core::report::{FileSink, ReportSink};

use crate::shell::Shell;

/// The single-target path: one probe, then a shell handoff on confirmation.
/// A 503 here is as fatal as it is in a batch, and a transport error still
/// leaves its detail in the failure log before the process exits.
pub async fn probe(
    url: &str,
    headers: &HeaderSet,
    cfg: &Config,
    error_log: &Path,
) -> anyhow::Result<()> {
    let endpoint = target::normalize(url);
    let service_probe = ServiceProbe::new(headers, cfg.timeout, cfg.proxy.as_ref())?;

    info!("fingerprinting {}", endpoint);

    let outcome = match service_probe.probe(&endpoint).await {
        Ok(outcome) => outcome,
        Err(ProbeError::CircuitBreak { endpoint }) => {
            error!("{} answered 503, stopping", endpoint);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    match outcome {
        ProbeOutcome::Confirmed {
            endpoint, version, ..
        } => {
            match &version {
                Some(version) => info!("{} is a live Ollama instance, v{}", endpoint, version),
                None => info!("{} is a live Ollama instance, version unknown", endpoint),
            }
            Shell::new(&service_probe, endpoint).run().await
        }
        ProbeOutcome::Rejected { endpoint, status } => {
            warn!(
                "{} does not match the Ollama fingerprint (status {})",
                endpoint, status
            );
            Ok(())
        }
        ProbeOutcome::Errored { endpoint, cause } => {
            let mut failures = FileSink::failures(error_log)?;
            failures.append(&format!("{endpoint} {cause}"))?;
            anyhow::bail!("{endpoint} is unreachable (logged)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    #[tokio::test]
    async fn transport_error_is_logged_before_the_command_fails() {
        let dir = tempfile::tempdir().unwrap();
        let error_log = dir.path().join("error.log");

        let cfg = Config {
            delay: Duration::from_millis(1),
            timeout: Duration::from_secs(2),
            proxy: None,
            no_banner: true,
        };
        let headers = HeaderSet::with_agent("probr-test-agent");

        // Port 1 on loopback refuses connections
        let result = probe("127.0.0.1:1", &headers, &cfg, &error_log).await;

        assert!(result.is_err(), "an unreachable single target must fail");

        let contents = fs::read_to_string(&error_log).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(
            contents.contains("http://127.0.0.1:1/"),
            "failure line should name the normalized target: {}",
            contents
        );
    }
}
