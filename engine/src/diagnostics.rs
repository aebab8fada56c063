//! Tick timing probes, enabled with `EngineConfig::debug_timings`.

use std::time::{Duration, Instant};

/// Wall time spent in each phase of one `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickTimings {
    /// Queue drain, job dispatch and waiting for dynamics workers
    pub dynamics: Duration,
    /// Building the hitbox index
    pub hitbox_index: Duration,
    /// Raytracing, event emission and buffer swap
    pub resolve: Duration,
}

impl TickTimings {
    pub fn total(&self) -> Duration {
        self.dynamics + self.hitbox_index + self.resolve
    }
}

/// Stopwatch that only reads the clock when enabled.
pub struct PhaseTimer {
    last: Option<Instant>,
}

impl PhaseTimer {
    pub fn start(enabled: bool) -> Self {
        Self {
            last: enabled.then(Instant::now),
        }
    }

    /// Time since the previous lap (or start). Zero when disabled.
    pub fn lap(&mut self) -> Duration {
        match self.last.as_mut() {
            Some(last) => {
                let now = Instant::now();
                let elapsed = now - *last;
                *last = now;
                elapsed
            }
            None => Duration::ZERO,
        }
    }

    pub fn enabled(&self) -> bool {
        self.last.is_some()
    }
}
