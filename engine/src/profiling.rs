use std::time::Duration;

use tracing::trace;

#[derive(Debug, Clone, Copy, Default)]
pub struct StepTimings {
    pub step: Duration,
    pub record: Duration,
    pub total: Duration,
}

/// Optional hook for capturing engine step timings.
pub trait Profiler {
    fn on_step(&mut self, _frame: usize, _timings: StepTimings) {}
}

/// Emits every step's timings as a `trace` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProfiler;

impl Profiler for TracingProfiler {
    fn on_step(&mut self, frame: usize, timings: StepTimings) {
        trace!(
            frame,
            step_us = timings.step.as_micros() as u64,
            record_us = timings.record.as_micros() as u64,
            total_us = timings.total.as_micros() as u64,
            "engine step"
        );
    }
}
