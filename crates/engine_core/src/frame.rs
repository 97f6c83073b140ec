//! Frame pacing.
//!
//! The [`FrameRateController`] measures the time between frames and sleeps
//! off whatever is left of each frame's budget.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::EngineConfig;

/// Measures frame time and paces the game loop to a target rate.
#[derive(Debug)]
pub struct FrameRateController {
    budget: Option<Duration>,
    fixed_timestep: bool,
    max_dt: f32,
    frame_start: Option<Instant>,
}

impl FrameRateController {
    /// Create a controller from the engine configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            budget: config.frame_duration().map(Duration::from_secs_f64),
            fixed_timestep: config.fixed_timestep,
            max_dt: config.max_dt,
            frame_start: None,
        }
    }

    /// Marks the start of a frame and returns the elapsed time to simulate,
    /// in seconds.
    ///
    /// The first frame, and every frame in fixed-timestep mode, reports the
    /// nominal frame duration.
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        let nominal = self.budget.map_or(0.0, |b| b.as_secs_f32());
        let dt = match self.frame_start {
            Some(start) if !self.fixed_timestep => now.duration_since(start).as_secs_f32(),
            _ => nominal,
        };
        self.frame_start = Some(now);
        dt.min(self.max_dt)
    }

    /// Sleeps until the frame budget is used up. Logs a warning if the frame
    /// overran its budget.
    pub fn end_frame(&self, frame: u64) {
        let (Some(budget), Some(start)) = (self.budget, self.frame_start) else {
            return;
        };
        let elapsed = start.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        } else {
            warn!(
                frame,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = budget.as_millis() as u64,
                "frame exceeded time budget"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_reports_nominal_dt() {
        let mut frc = FrameRateController::new(&EngineConfig::default().with_frame_rate(50.0));
        assert!((frc.begin_frame() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_timestep_is_constant() {
        let config = EngineConfig::default()
            .with_frame_rate(100.0)
            .with_fixed_timestep(true);
        let mut frc = FrameRateController::new(&config);
        for _ in 0..3 {
            assert!((frc.begin_frame() - 0.01).abs() < 1e-6);
        }
    }

    #[test]
    fn test_dt_is_clamped() {
        let config = EngineConfig {
            frame_rate: 1.0,
            max_dt: 0.1,
            ..EngineConfig::default()
        };
        let mut frc = FrameRateController::new(&config);
        assert!((frc.begin_frame() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_end_frame_waits_out_budget() {
        let mut frc = FrameRateController::new(&EngineConfig::default().with_frame_rate(200.0));
        let before = Instant::now();
        frc.begin_frame();
        frc.end_frame(1);
        assert!(before.elapsed() >= Duration::from_micros(4900));
        let dt = frc.begin_frame();
        assert!(dt >= 0.0049);
    }

    #[test]
    fn test_uncapped_never_sleeps() {
        let mut frc = FrameRateController::new(&EngineConfig::default().with_frame_rate(0.0));
        assert_eq!(frc.begin_frame(), 0.0);
        frc.end_frame(1);
    }
}
