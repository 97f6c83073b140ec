//! Audio system. Plays named cues from [`Message::PlaySound`].

use std::collections::BTreeMap;

use engine_core::{Context, Message, System};
use tracing::{debug, info};

/// Tracks which cues were requested and how often.
#[derive(Debug, Default)]
pub struct AudioSystem {
    played: BTreeMap<String, u32>,
}

impl AudioSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts playback of `cue`.
    pub fn play(&mut self, cue: &str) {
        debug!(cue, "playing sound");
        *self.played.entry(cue.to_string()).or_default() += 1;
    }
}

impl System for AudioSystem {
    fn name(&self) -> &str {
        "Audio"
    }

    fn update(&mut self, _dt: f32, _ctx: &mut Context<'_>) {}

    fn send_message(&mut self, message: &Message, _ctx: &mut Context<'_>) {
        if let Message::PlaySound(cue) = message {
            self.play(cue);
        }
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        info!(cues = ?self.played, "audio shut down");
    }
}
