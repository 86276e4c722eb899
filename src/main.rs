//! # Rexomiser: Exome Variant Prioritisation
//!
//! Filters an annotated exome, aggregates the survivors into genes and ranks
//! them by phenotype similarity to model organisms.
//!
//! ## Usage
//! ```bash
//! # Single analysis
//! rexomiser --analysis pfeiffer.json --data reference.json
//!
//! # Batch of analyses, run concurrently
//! rexomiser --analysis-batch cohort.txt --data reference.json --parallel-batch
//!
//! # With profiling output
//! rexomiser --analysis pfeiffer.json --data reference.json --profile
//! ```

use std::sync::Arc;
use std::time::Instant;

use rexomiser::config::Config;
use rexomiser::io::{read_batch_file, InMemoryDataSource};
use rexomiser::pipelines::{AnalysisBuilder, BatchRunner};
use rexomiser::utils::telemetry::{HeartbeatConfig, HeartbeatHandle, Stage, TelemetryBlackboard};
use rexomiser::utils::threading::configure_global_pool;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber. Span timings are printed with `--profile`.
fn init_tracing(config: &Config) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let level = if config.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let span_events = if config.profile {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(span_events)
                .with_target(false)
                .with_timer(fmt::time::uptime())
                .with_filter(level),
        )
        .init();
}

fn run() -> anyhow::Result<()> {
    let start = Instant::now();

    let config = Config::parse_and_validate()?;
    init_tracing(&config);
    if config.profile {
        eprintln!("=== Profiling enabled ===\n");
    }

    let n_threads = configure_global_pool(config.nthreads());

    eprintln!("Rexomiser v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Threads: {}", n_threads);

    let telemetry = TelemetryBlackboard::new();
    let heartbeat = (!config.no_heartbeat)
        .then(|| HeartbeatHandle::spawn(telemetry.clone(), HeartbeatConfig::default()));

    telemetry.set_stage(Stage::LoadingData);
    let data_source = match &config.data {
        Some(path) => Arc::new(InMemoryDataSource::open(path)?),
        None => {
            tracing::warn!("No --data given; annotation and phenotype lookups will return nothing");
            Arc::new(InMemoryDataSource::new())
        }
    };
    let builder = AnalysisBuilder::new(data_source.clone(), data_source);

    let analyses = match (&config.analysis, &config.analysis_batch) {
        (Some(path), _) => vec![path.clone()],
        (None, Some(batch)) => read_batch_file(batch)?,
        (None, None) => anyhow::bail!("No analysis given"),
    };
    eprintln!("Analyses: {}", analyses.len());
    eprintln!("Output: {:?}", config.out_dir);

    let outcomes = BatchRunner::new(&builder, &config.out_dir)
        .parallel(config.parallel_batch)
        .with_telemetry(telemetry.clone())
        .run(&analyses);

    telemetry.set_stage(Stage::Complete);
    if let Some(heartbeat) = heartbeat {
        heartbeat.shutdown();
    }

    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => eprintln!("  {} -> {}", outcome.analysis.display(), path.display()),
            Err(e) => eprintln!("  {} FAILED: {:#}", outcome.analysis.display(), e),
        }
    }
    let n_failed = outcomes.iter().filter(|o| !o.succeeded()).count();

    let elapsed = start.elapsed();
    eprintln!("\nCompleted in {:.2}s", elapsed.as_secs_f64());

    if n_failed > 0 {
        anyhow::bail!("{} of {} analyses failed", n_failed, outcomes.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rexomiser::{config, error, io, pipelines, prioritisers};

    #[test]
    fn test_module_imports() {
        let _ = config::Config::parse_and_validate;
        let _ = error::RexomiserError::config("test");
        let _ = io::load_analysis;
        let _ = pipelines::AnalysisBuilder::new;
        let _ = prioritisers::PhivePrioritiser::new;
    }
}
