//! Lightweight phase timing for the coupling loop.
//!
//! Timers are off unless enabled programmatically or via the `FW_TIMING`
//! environment variable. Summaries go through `tracing`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable phase timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable phase timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("FW_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    start: Instant,
    enabled: bool,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and add the elapsed time to an accumulator.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Per-phase timers of one FSI sub-iteration.
pub mod coupling_timing {
    use super::AccumulatingTimer;

    /// Aerodynamic grid regeneration
    pub static GRID_GENERATION: AccumulatingTimer = AccumulatingTimer::new();
    /// External aerodynamic solve
    pub static AERO_SOLVE: AccumulatingTimer = AccumulatingTimer::new();
    /// Aero-to-structure force mapping
    pub static FORCE_MAPPING: AccumulatingTimer = AccumulatingTimer::new();
    /// External structural solve
    pub static STRUCT_SOLVE: AccumulatingTimer = AccumulatingTimer::new();

    pub fn reset_all() {
        GRID_GENERATION.reset();
        AERO_SOLVE.reset();
        FORCE_MAPPING.reset();
        STRUCT_SOLVE.reset();
    }

    /// Emit a phase breakdown through tracing.
    pub fn log_summary() {
        if !super::is_enabled() {
            return;
        }
        let phases: [(&str, &AccumulatingTimer); 4] = [
            ("grid generation", &GRID_GENERATION),
            ("aero solve", &AERO_SOLVE),
            ("force mapping", &FORCE_MAPPING),
            ("structural solve", &STRUCT_SOLVE),
        ];
        for (label, timer) in phases {
            if timer.count() > 0 {
                tracing::info!(
                    phase = label,
                    calls = timer.count(),
                    total_s = timer.total_seconds(),
                    avg_ms = timer.average_seconds() * 1000.0,
                    "coupling phase timing"
                );
            }
        }
    }
}
