//! Engine configuration.

/// Configuration for the engine's frame loop and message dispatch.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target frames per second. `0.0` runs uncapped.
    pub frame_rate: f64,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_frames: u64,
    /// Report the nominal frame duration as `dt` instead of measured time.
    pub fixed_timestep: bool,
    /// Longest `dt` handed to systems, in seconds. Guards against huge steps
    /// after a stall.
    pub max_dt: f32,
    /// Maximum number of queued messages delivered in one drain before the
    /// rest are dropped. Values below 1 are treated as 1.
    pub max_dispatch: usize,
}

impl EngineConfig {
    /// Set the target frame rate.
    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Stop after `max_frames` frames.
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Use a fixed timestep.
    #[must_use]
    pub fn with_fixed_timestep(mut self, fixed: bool) -> Self {
        self.fixed_timestep = fixed;
        self
    }

    /// Nominal frame duration in seconds, or `None` when uncapped.
    #[must_use]
    pub fn frame_duration(&self) -> Option<f64> {
        (self.frame_rate > 0.0).then(|| 1.0 / self.frame_rate)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 0,
            fixed_timestep: false,
            max_dt: 0.25,
            max_dispatch: 1024,
        }
    }
}
