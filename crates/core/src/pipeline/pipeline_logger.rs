use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for orchestration events.
///
/// Keeps the use case independent of where progress goes (log lines,
/// a progress bar, nothing at all in tests).
pub trait PipelineLogger: Send {
    /// `current` of `total` frames have reached the encoder.
    fn progress(&mut self, current: usize, total: usize);

    /// Wall time spent in a named stage for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time sample such as reorder-buffer depth.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: nothing.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Stats {
    count: usize,
    total: f64,
    max: f64,
}

impl Stats {
    fn record(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.max = self.max.max(value);
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Forwards events to the `log` facade.
///
/// Progress lines are throttled to one every `throttle_frames` frames
/// (plus the last one); stage timings and metrics are aggregated for the
/// end-of-run summary.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    stages: BTreeMap<String, Stats>,
    metrics: BTreeMap<String, Stats>,
    started: Instant,
    frames: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
            frames: 0,
        }
    }

    /// Formatted summary, or `None` before anything was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Render summary ({} frames, {:.1}s):",
            self.frames,
            elapsed_ms / 1000.0
        )];

        for (stage, stats) in &self.stages {
            let share = if elapsed_ms > 0.0 {
                stats.total / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:<10} avg {:>8.1}ms  max {:>8.1}ms  total {:>9.1}ms ({share:.0}%)",
                stats.mean(),
                stats.max,
                stats.total
            ));
        }
        for (name, stats) in &self.metrics {
            lines.push(format!("  {name}: avg {:.1}, max {:.1}", stats.mean(), stats.max));
        }
        if self.frames > 0 && elapsed_ms > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.frames as f64 / (elapsed_ms / 1000.0)
            ));
        }
        Some(lines.join("\n"))
    }

    fn stage(&self, stage: &str) -> Option<Stats> {
        self.stages.get(stage).copied()
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = current;
        if total > 0 && (current % self.throttle_frames == 0 || current == total) {
            log::info!(
                "Encoded {current}/{total} frames ({:.1}%)",
                current as f64 / total as f64 * 100.0
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.stages
            .entry(stage.to_string())
            .or_default()
            .record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().record(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
