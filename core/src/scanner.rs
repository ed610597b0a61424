//! # Throttled Batch Scanning
//!
//! Walks a candidate list in input order against one [`ServiceProbe`]:
//! normalize, pause, probe, route the outcome. Strictly sequential, one
//! probe in flight at a time. Parallelism is deliberately absent so a run
//! never hammers unknown third-party infrastructure.
//!
//! A single bad target never aborts the batch. The lone exception is the
//! 503 circuit breaker, which propagates out of [`ScanSession::run_batch`]
//! untouched and ends the run.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use probr_common::target;

use crate::probe::{ProbeError, ProbeOutcome, ServiceProbe};
use crate::report::ReportSink;

/// Called with every outcome as it is classified; gives the UI layer live
/// feedback without the scanner knowing about terminals.
pub type OutcomeObserver = Box<dyn Fn(&ProbeOutcome) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("failed to record outcome: {0}")]
    Report(#[from] io::Error),
}

/// One batch run: the probe, the throttle, both sinks, a running count.
/// Created at batch start, discarded when the candidate list is exhausted.
pub struct ScanSession<'a> {
    probe: &'a ServiceProbe,
    delay: Duration,
    results: &'a mut dyn ReportSink,
    failures: &'a mut dyn ReportSink,
    observer: Option<OutcomeObserver>,
    cancel: Arc<AtomicBool>,
    confirmed: usize,
}

impl<'a> ScanSession<'a> {
    pub fn new(
        probe: &'a ServiceProbe,
        delay: Duration,
        results: &'a mut dyn ReportSink,
        failures: &'a mut dyn ReportSink,
    ) -> Self {
        Self {
            probe,
            delay,
            results,
            failures,
            observer: None,
            cancel: Arc::new(AtomicBool::new(false)),
            confirmed: 0,
        }
    }

    pub fn with_observer(mut self, observer: OutcomeObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The flag a Ctrl-C handler flips. Checked between probes, so an
    /// interrupt takes effect once the in-flight probe has finished.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Probes every candidate in input order and returns the number of
    /// confirmed findings. Duplicates are probed independently.
    pub async fn run_batch<I, S>(&mut self, candidates: I) -> Result<usize, ScanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for candidate in candidates {
            if self.cancel.load(Ordering::Relaxed) {
                warn!("interrupted, stopping the batch");
                break;
            }

            let endpoint = target::normalize(candidate.as_ref());

            tokio::time::sleep(self.delay).await;

            let outcome = self.probe.probe(&endpoint).await?;
            self.route(&outcome)?;
        }

        Ok(self.confirmed)
    }

    fn route(&mut self, outcome: &ProbeOutcome) -> Result<(), ScanError> {
        match outcome {
            ProbeOutcome::Confirmed {
                endpoint,
                content_length,
                version,
            } => {
                self.results
                    .append(&format!("{endpoint} {content_length}"))?;
                self.confirmed += 1;
                match version {
                    Some(version) => info!("{} fingerprinted as Ollama v{}", endpoint, version),
                    None => {
                        // Secondary lookup failed; the match stands but the
                        // miss is worth a diagnostic line
                        info!("{} fingerprinted as Ollama, version unknown", endpoint);
                        self.failures.append(&format!(
                            "{endpoint} api/version lookup failed after a positive fingerprint"
                        ))?;
                    }
                }
            }
            ProbeOutcome::Rejected { endpoint, status } => {
                // Informational only, nothing persisted
                info!("{} does not look like Ollama (status {})", endpoint, status);
            }
            ProbeOutcome::Errored { endpoint, cause } => {
                warn!("{} refused contact, skipping (logged)", endpoint);
                self.failures.append(&format!("{endpoint} {cause}"))?;
            }
        }

        if let Some(observer) = &self.observer {
            observer(outcome);
        }

        Ok(())
    }
}
