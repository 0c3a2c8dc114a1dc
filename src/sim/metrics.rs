// Headless simulation metrics

use std::time::Duration;

use serde::Serialize;

/// Final report printed by the runner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationMetrics {
    pub ticks: u64,
    pub simulated_seconds: f32,
    pub catches: u32,
    /// Catches per simulated minute
    pub catch_rate: f32,
    /// Mean world length of one path step across agents' cached paths (pixels)
    pub average_path_step: f32,
    /// Mean wall-clock time of one agent decision (milliseconds)
    pub mean_decision_ms: f64,
    pub coordination_events: u64,
    pub messages_sent: u64,
    /// Mean time the player survived per life (seconds)
    pub player_escape_time: f32,
}

#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    ticks: u64,
    decisions: u64,
    decision_time: Duration,
    coordination_events: u64,
    messages_sent: u64,
    catches: u32,
    lives: Vec<f32>,
    path_steps: Vec<f32>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&mut self, agents: usize, elapsed: Duration, messages: usize, coordinated_attacks: usize) {
        self.ticks += 1;
        self.decisions += agents as u64;
        self.decision_time += elapsed;
        self.messages_sent += messages as u64;
        self.coordination_events += coordinated_attacks as u64;
    }

    /// Player caught after surviving `survived` seconds
    pub fn record_catch(&mut self, survived: f32) {
        self.catches += 1;
        self.lives.push(survived);
    }

    /// Mean step length of a cached path (ignored when fewer than two waypoints)
    pub fn record_path(&mut self, world_length: f32, waypoints: usize) {
        if waypoints > 1 {
            self.path_steps.push(world_length / (waypoints - 1) as f32);
        }
    }

    pub fn catches(&self) -> u32 {
        self.catches
    }

    /// `final_life` is how long the player has survived since the last catch
    pub fn finish(&self, simulated_seconds: f32, final_life: f32) -> SimulationMetrics {
        let mean = |xs: &[f32]| {
            if xs.is_empty() {
                0.0
            } else {
                xs.iter().sum::<f32>() / xs.len() as f32
            }
        };

        let mut lives = self.lives.clone();
        if final_life > 0.0 || lives.is_empty() {
            lives.push(final_life);
        }

        let minutes = simulated_seconds / 60.0;
        SimulationMetrics {
            ticks: self.ticks,
            simulated_seconds,
            catches: self.catches,
            catch_rate: if minutes > 0.0 { self.catches as f32 / minutes } else { 0.0 },
            average_path_step: mean(&self.path_steps),
            mean_decision_ms: if self.decisions > 0 {
                self.decision_time.as_secs_f64() * 1000.0 / self.decisions as f64
            } else {
                0.0
            },
            coordination_events: self.coordination_events,
            messages_sent: self.messages_sent,
            player_escape_time: mean(&lives),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_aggregates() {
        let mut metrics = MetricsCollector::new();
        metrics.record_tick(4, Duration::from_millis(4), 3, 1);
        metrics.record_tick(4, Duration::from_millis(4), 1, 0);
        metrics.record_catch(20.0);
        metrics.record_path(120.0, 4);
        metrics.record_path(0.0, 1);

        let report = metrics.finish(60.0, 40.0);
        assert_eq!(report.ticks, 2);
        assert_eq!(report.catches, 1);
        assert!((report.catch_rate - 1.0).abs() < 0.001);
        assert!((report.average_path_step - 40.0).abs() < 0.001);
        assert!((report.mean_decision_ms - 1.0).abs() < 0.001);
        assert_eq!(report.coordination_events, 1);
        assert_eq!(report.messages_sent, 4);
        assert!((report.player_escape_time - 30.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_run() {
        let report = MetricsCollector::new().finish(0.0, 0.0);
        assert_eq!(report.catch_rate, 0.0);
        assert_eq!(report.player_escape_time, 0.0);
    }
}
