use std::time::{Duration, Instant};

use tracing::info;

use super::metrics::{MetricsAccumulator, TickMetrics};
use super::{InputSnapshot, Scene};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub tick_millis: u32,
    pub max_ticks: u64,
    pub metrics_log_interval_ticks: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_millis: 16,
            max_ticks: 3600,
            metrics_log_interval_ticks: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub simulated_millis: u64,
    pub wall_time: Duration,
}

/// Supplies the input for each tick. `default_delta_millis` is the configured tick length;
/// sources are free to override it (scripted frames do).
pub trait InputSource {
    fn next_input(&mut self, tick: u64, default_delta_millis: u32) -> InputSnapshot;
}

impl<F> InputSource for F
where
    F: FnMut(u64, u32) -> InputSnapshot,
{
    fn next_input(&mut self, tick: u64, default_delta_millis: u32) -> InputSnapshot {
        self(tick, default_delta_millis)
    }
}

/// Runs `scene` for `config.max_ticks` fixed ticks without a window.
pub fn run_headless<S, I>(config: &LoopConfig, scene: &mut S, input_source: &mut I) -> LoopSummary
where
    S: Scene + ?Sized,
    I: InputSource + ?Sized,
{
    let started = Instant::now();
    let tick_millis = config.tick_millis.max(1);
    let mut metrics = MetricsAccumulator::new(config.metrics_log_interval_ticks);
    let mut simulated_millis = 0u64;

    info!(
        tick_millis,
        max_ticks = config.max_ticks,
        scene = scene.debug_title().as_deref().unwrap_or("untitled"),
        "loop_started"
    );

    for tick in 0..config.max_ticks {
        let input = input_source.next_input(tick, tick_millis);
        scene.update(&input);
        metrics.record_tick(input.delta_millis());
        simulated_millis = simulated_millis.saturating_add(u64::from(input.delta_millis()));
        if let Some(snapshot) = metrics.maybe_roll() {
            log_metrics(scene.tick_count(), snapshot);
        }
    }

    let summary = LoopSummary {
        ticks: config.max_ticks,
        simulated_millis,
        wall_time: started.elapsed(),
    };
    info!(
        ticks = summary.ticks,
        simulated_ms = summary.simulated_millis,
        wall_ms = summary.wall_time.as_millis() as u64,
        "loop_finished"
    );
    summary
}

fn log_metrics(scene_tick: u64, snapshot: TickMetrics) {
    info!(
        scene_tick,
        ticks = snapshot.ticks,
        simulated_ms = snapshot.simulated_millis,
        tps = f64::from(snapshot.ticks_per_second),
        "loop_metrics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingScene {
        ticks: u64,
        total_delta: u64,
    }

    impl Scene for CountingScene {
        fn update(&mut self, input: &InputSnapshot) {
            self.ticks += 1;
            self.total_delta += u64::from(input.delta_millis());
        }

        fn tick_count(&self) -> u64 {
            self.ticks
        }
    }

    #[test]
    fn runs_exactly_max_ticks_with_default_delta() {
        let config = LoopConfig {
            tick_millis: 20,
            max_ticks: 50,
            metrics_log_interval_ticks: 10,
        };
        let mut scene = CountingScene::default();
        let mut source = |_tick: u64, delta: u32| InputSnapshot::idle(delta);
        let summary = run_headless(&config, &mut scene, &mut source);
        assert_eq!(scene.ticks, 50);
        assert_eq!(scene.total_delta, 1000);
        assert_eq!(summary.simulated_millis, 1000);
    }

    #[test]
    fn input_source_can_override_delta() {
        let config = LoopConfig {
            max_ticks: 3,
            ..LoopConfig::default()
        };
        let mut scene = CountingScene::default();
        let mut source = |tick: u64, _delta: u32| InputSnapshot::idle(tick as u32 * 100);
        let summary = run_headless(&config, &mut scene, &mut source);
        assert_eq!(summary.simulated_millis, 300);
    }
}
