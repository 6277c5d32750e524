use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickMetrics {
    pub ticks: u64,
    pub simulated_millis: u64,
    pub wall_time: Duration,
    pub ticks_per_second: f32,
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval_ticks: u64,
    ticks: u64,
    simulated_millis: u64,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval_ticks: u64) -> Self {
        Self {
            interval_start: Instant::now(),
            interval_ticks: interval_ticks.max(1),
            ticks: 0,
            simulated_millis: 0,
        }
    }

    pub(crate) fn record_tick(&mut self, delta_millis: u32) {
        self.ticks = self.ticks.saturating_add(1);
        self.simulated_millis = self.simulated_millis.saturating_add(u64::from(delta_millis));
    }

    /// Returns the closed interval once `interval_ticks` ticks have been recorded.
    pub(crate) fn maybe_roll(&mut self) -> Option<TickMetrics> {
        if self.ticks < self.interval_ticks {
            return None;
        }
        Some(self.roll(Instant::now()))
    }

    fn roll(&mut self, now: Instant) -> TickMetrics {
        let wall_time = now.saturating_duration_since(self.interval_start);
        let seconds = wall_time.as_secs_f32();
        let ticks_per_second = if seconds > 0.0 {
            self.ticks as f32 / seconds
        } else {
            0.0
        };
        let snapshot = TickMetrics {
            ticks: self.ticks,
            simulated_millis: self.simulated_millis,
            wall_time,
            ticks_per_second,
        };
        self.interval_start = now;
        self.ticks = 0;
        self.simulated_millis = 0;
        snapshot
    }
}
