use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::Context;
use colored::*;
use tracing::{error, info, warn};

use probr_common::{config::Config, headers::HeaderSet};
use probr_core::probe::{ProbeError, ServiceProbe};
use probr_core::report::FileSink;
use probr_core::scanner::{ScanError, ScanSession};
use probr_core::sources;

use crate::terminal::{colors, print, spinner};

pub async fn scan(
    file: &Path,
    output: &Path,
    error_log: &Path,
    headers: &HeaderSet,
    cfg: &Config,
) -> anyhow::Result<()> {
    let candidates = sources::from_file(file)
        .with_context(|| format!("failed to read candidate file {}", file.display()))?;

    if candidates.is_empty() {
        warn!("{} holds no candidates, nothing to do", file.display());
        return Ok(());
    }

    let total = candidates.len();
    info!("loaded {} candidates from {}", total, file.display());

    let probe = ServiceProbe::new(headers, cfg.timeout, cfg.proxy.as_ref())?;
    let mut results = FileSink::results(output)
        .with_context(|| format!("cannot open result file {}", output.display()))?;
    let mut failures = FileSink::failures(error_log)
        .with_context(|| format!("cannot open error log {}", error_log.display()))?;

    let probed = Arc::new(AtomicUsize::new(0));
    let confirmed_so_far = Arc::new(AtomicUsize::new(0));
    let observer = {
        let probed = probed.clone();
        let confirmed_so_far = confirmed_so_far.clone();
        Box::new(move |outcome: &probr_core::probe::ProbeOutcome| {
            let done = probed.fetch_add(1, Ordering::Relaxed) + 1;
            if matches!(outcome, probr_core::probe::ProbeOutcome::Confirmed { .. }) {
                confirmed_so_far.fetch_add(1, Ordering::Relaxed);
            }
            spinner::report_scan_progress(done, total, confirmed_so_far.load(Ordering::Relaxed));
        })
    };

    let mut session = ScanSession::new(&probe, cfg.delay, &mut results, &mut failures)
        .with_observer(observer);

    spawn_interrupt_handler(session.cancel_flag());
    spinner::report_scan_progress(0, total, 0);

    let start_time = Instant::now();
    let confirmed = match session.run_batch(&candidates).await {
        Ok(confirmed) => confirmed,
        Err(ScanError::Probe(ProbeError::CircuitBreak { endpoint })) => {
            spinner::finish();
            error!("{} answered 503, aborting the entire run", endpoint);
            std::process::exit(1);
        }
        Err(e) => {
            spinner::finish();
            return Err(e.into());
        }
    };

    spinner::finish();
    scan_ends(confirmed, total, start_time.elapsed().as_secs_f64(), output);
    Ok(())
}

/// First Ctrl-C flips the cancel flag; the batch stops once the in-flight
/// probe returns. Sinks open per write, so nothing is left half-written.
fn spawn_interrupt_handler(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing the in-flight probe");
            cancel.store(true, Ordering::Relaxed);
        }
    });
}

fn scan_ends(confirmed: usize, total: usize, elapsed: f64, output: &Path) {
    if confirmed == 0 {
        print::header("ZERO INSTANCES CONFIRMED");
        print::no_results();
        print::end_of_program();
        return;
    }

    let confirmed_str: ColoredString = format!("{confirmed} confirmed instances").bold().green();
    let elapsed_str: ColoredString = format!("{elapsed:.2}s").bold().yellow();
    let summary: ColoredString =
        format!("Scan complete: {confirmed_str} out of {total} targets in {elapsed_str}")
            .color(colors::TEXT_DEFAULT);

    print::fat_separator();
    print::centerln(&summary.to_string());
    print::print_status(format!("Findings written to {}", output.display()));
    print::end_of_program();
}
