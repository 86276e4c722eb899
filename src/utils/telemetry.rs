//! # Telemetry Blackboard
//!
//! Thread-safe progress tracking for analysis runs.
//! Uses atomic counters that can be cheaply updated from rayon parallel iterators.
//!
//! Workers bump counters; a background heartbeat thread periodically reads
//! and reports them:
//! - a single rewritten line when stderr is a terminal
//! - a `[HEARTBEAT] key=value` log line otherwise

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Processing stage for high-level progress tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Stage {
    Initializing = 0,
    LoadingData = 1,
    VariantPhase = 2,
    Aggregating = 3,
    GenePhase = 4,
    Scoring = 5,
    WritingOutput = 6,
    Complete = 7,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Initializing => "Initializing",
            Stage::LoadingData => "Loading Data",
            Stage::VariantPhase => "Variant Filters",
            Stage::Aggregating => "Gene Aggregation",
            Stage::GenePhase => "Gene Steps",
            Stage::Scoring => "Scoring",
            Stage::WritingOutput => "Writing Output",
            Stage::Complete => "Complete",
        }
    }

    fn from_u64(val: u64) -> Self {
        match val {
            0 => Stage::Initializing,
            1 => Stage::LoadingData,
            2 => Stage::VariantPhase,
            3 => Stage::Aggregating,
            4 => Stage::GenePhase,
            5 => Stage::Scoring,
            6 => Stage::WritingOutput,
            _ => Stage::Complete,
        }
    }
}

/// Global telemetry state. Relaxed ordering throughout; the heartbeat only
/// needs approximate values.
pub struct TelemetryBlackboard {
    stage: AtomicU64,

    // analysis i of n in a batch
    current_analysis: AtomicU64,
    total_analyses: AtomicU64,

    variants_processed: AtomicU64,
    total_variants: AtomicU64,
    genes_processed: AtomicU64,
    total_genes: AtomicU64,

    start_time: Instant,
    last_progress_nanos: AtomicU64,

    shutdown: AtomicBool,
}

impl TelemetryBlackboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // === Stage Updates ===

    #[inline]
    pub fn set_stage(&self, stage: Stage) {
        self.stage.store(stage as u64, Ordering::Relaxed);
        self.touch_progress();
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        Stage::from_u64(self.stage.load(Ordering::Relaxed))
    }

    // === Batch Progress ===

    /// Start counting a new batch of `n` analyses.
    pub fn set_total_analyses(&self, n: u64) {
        self.total_analyses.store(n, Ordering::Relaxed);
        self.current_analysis.store(0, Ordering::Relaxed);
    }

    pub fn inc_analyses(&self) {
        self.current_analysis.fetch_add(1, Ordering::Relaxed);
        self.touch_progress();
    }

    // === Record Progress ===

    /// Start counting a new phase over `n_variants` variants.
    pub fn begin_variants(&self, n_variants: u64) {
        self.total_variants.store(n_variants, Ordering::Relaxed);
        self.variants_processed.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_variants(&self, n: u64) {
        self.variants_processed.fetch_add(n, Ordering::Relaxed);
        self.touch_progress();
    }

    pub fn begin_genes(&self, n_genes: u64) {
        self.total_genes.store(n_genes, Ordering::Relaxed);
        self.genes_processed.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_genes(&self, n: u64) {
        self.genes_processed.fetch_add(n, Ordering::Relaxed);
        self.touch_progress();
    }

    pub fn analyses_completed(&self) -> u64 {
        self.current_analysis.load(Ordering::Relaxed)
    }

    pub fn variants_processed(&self) -> u64 {
        self.variants_processed.load(Ordering::Relaxed)
    }

    pub fn genes_processed(&self) -> u64 {
        self.genes_processed.load(Ordering::Relaxed)
    }

    // === Timing ===

    #[inline]
    fn touch_progress(&self) {
        let elapsed = self.start_time.elapsed().as_nanos() as u64;
        self.last_progress_nanos.store(elapsed, Ordering::Relaxed);
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            stage: self.stage(),
            current_analysis: self.current_analysis.load(Ordering::Relaxed),
            total_analyses: self.total_analyses.load(Ordering::Relaxed),
            variants_processed: self.variants_processed.load(Ordering::Relaxed),
            total_variants: self.total_variants.load(Ordering::Relaxed),
            genes_processed: self.genes_processed.load(Ordering::Relaxed),
            total_genes: self.total_genes.load(Ordering::Relaxed),
            elapsed_secs: self.elapsed_secs(),
            last_progress_nanos: self.last_progress_nanos.load(Ordering::Relaxed),
            current_nanos: self.start_time.elapsed().as_nanos() as u64,
        }
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

impl Default for TelemetryBlackboard {
    fn default() -> Self {
        Self {
            stage: AtomicU64::new(Stage::Initializing as u64),
            current_analysis: AtomicU64::new(0),
            total_analyses: AtomicU64::new(0),
            variants_processed: AtomicU64::new(0),
            total_variants: AtomicU64::new(0),
            genes_processed: AtomicU64::new(0),
            total_genes: AtomicU64::new(0),
            start_time: Instant::now(),
            last_progress_nanos: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        }
    }
}

struct TelemetrySnapshot {
    stage: Stage,
    current_analysis: u64,
    total_analyses: u64,
    variants_processed: u64,
    total_variants: u64,
    genes_processed: u64,
    total_genes: u64,
    elapsed_secs: f64,
    last_progress_nanos: u64,
    current_nanos: u64,
}

/// Heartbeat output configuration
pub struct HeartbeatConfig {
    /// Interval between heartbeats (seconds)
    pub interval_secs: u64,
    /// Stall warning threshold (seconds with no progress)
    pub stall_threshold_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            stall_threshold_secs: 300,
        }
    }
}

/// Handle to the heartbeat thread
pub struct HeartbeatHandle {
    handle: Option<JoinHandle<()>>,
    blackboard: Arc<TelemetryBlackboard>,
}

impl HeartbeatHandle {
    pub fn spawn(blackboard: Arc<TelemetryBlackboard>, config: HeartbeatConfig) -> Self {
        let bb = blackboard.clone();
        let is_tty = io::stderr().is_terminal();

        let handle = thread::Builder::new()
            .name("heartbeat".to_string())
            .spawn(move || {
                heartbeat_loop(bb, config, is_tty);
            })
            .expect("Failed to spawn heartbeat thread");

        Self {
            handle: Some(handle),
            blackboard,
        }
    }

    /// Signal shutdown and wait for thread to finish
    pub fn shutdown(mut self) {
        self.blackboard.signal_shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        // Don't block in drop
        self.blackboard.signal_shutdown();
    }
}

/// Format duration in human-readable form
fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.0}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{:.0}m{:.0}s", mins, remaining_secs)
    } else {
        format!("{:.1}h", secs / 3600.0)
    }
}

fn heartbeat_loop(bb: Arc<TelemetryBlackboard>, config: HeartbeatConfig, is_tty: bool) {
    let interval = Duration::from_secs(config.interval_secs);
    let tick = Duration::from_millis(200);
    let mut last_variants = 0u64;
    let mut last_time = Instant::now();

    'outer: loop {
        // Sleep in short ticks so shutdown is not delayed by a full interval
        let wake = Instant::now() + interval;
        while Instant::now() < wake {
            if bb.is_shutdown() {
                break 'outer;
            }
            thread::sleep(tick);
        }

        let snap = bb.snapshot();

        let now = Instant::now();
        let dt = now.duration_since(last_time).as_secs_f64();
        let velocity = if dt > 0.1 {
            snap.variants_processed.saturating_sub(last_variants) as f64 / dt
        } else {
            0.0
        };
        last_variants = snap.variants_processed;
        last_time = now;

        let stall_secs =
            (snap.current_nanos.saturating_sub(snap.last_progress_nanos)) / 1_000_000_000;
        let is_stalled = stall_secs > config.stall_threshold_secs;

        if is_tty {
            print_tty_progress(&snap, velocity, is_stalled);
        } else {
            print_log_progress(&snap, velocity, is_stalled);
        }
    }

    if is_tty {
        eprint!("\r\x1b[K");
        let _ = io::stderr().flush();
    }
}

fn print_tty_progress(snap: &TelemetrySnapshot, velocity: f64, is_stalled: bool) {
    let analysis_str = if snap.total_analyses > 1 {
        format!("A{}/{} ", snap.current_analysis, snap.total_analyses)
    } else {
        String::new()
    };
    let stall_str = if is_stalled { " [STALLED]" } else { "" };

    eprint!(
        "\r{}{} | variants {}/{} | genes {}/{} | {:.0} var/s | {}{}    \x1b[K",
        analysis_str,
        snap.stage.as_str(),
        snap.variants_processed,
        snap.total_variants,
        snap.genes_processed,
        snap.total_genes,
        velocity,
        format_duration(snap.elapsed_secs),
        stall_str
    );
    let _ = io::stderr().flush();
}

fn print_log_progress(snap: &TelemetrySnapshot, velocity: f64, is_stalled: bool) {
    eprintln!(
        "[HEARTBEAT] stage=\"{}\" analysis={}/{} variants={}/{} genes={}/{} \
         velocity={:.0}/s elapsed={:.0}s stalled={}",
        snap.stage.as_str(),
        snap.current_analysis,
        snap.total_analyses,
        snap.variants_processed,
        snap.total_variants,
        snap.genes_processed,
        snap.total_genes,
        velocity,
        snap.elapsed_secs,
        is_stalled
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_roundtrip() {
        for stage in [
            Stage::Initializing,
            Stage::LoadingData,
            Stage::VariantPhase,
            Stage::Aggregating,
            Stage::GenePhase,
            Stage::Scoring,
            Stage::WritingOutput,
            Stage::Complete,
        ] {
            assert_eq!(Stage::from_u64(stage as u64), stage);
        }
    }

    #[test]
    fn test_blackboard_counters() {
        let bb = TelemetryBlackboard::new();
        bb.set_stage(Stage::VariantPhase);
        assert_eq!(bb.stage(), Stage::VariantPhase);

        bb.begin_variants(10);
        bb.inc_variants(4);
        bb.inc_variants(3);
        assert_eq!(bb.variants_processed(), 7);
        bb.begin_variants(5);
        assert_eq!(bb.variants_processed(), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m30s");
        assert_eq!(format_duration(3661.0), "1.0h");
    }

    #[test]
    fn test_heartbeat_shutdown() {
        let bb = TelemetryBlackboard::new();
        let handle = HeartbeatHandle::spawn(
            bb.clone(),
            HeartbeatConfig {
                interval_secs: 60,
                stall_threshold_secs: 300,
            },
        );
        handle.shutdown();
    }
}
