//! Input system.
//!
//! There is no window in the demo, so input comes from a script of key
//! events keyed by frame number. Each event is broadcast as
//! [`Message::Input`] on its frame.

use std::collections::VecDeque;

use engine_core::{Context, KeyCode, KeyEvent, Message, System};
use tracing::debug;

/// Replays scripted key events.
#[derive(Debug, Default)]
pub struct InputSystem {
    script: VecDeque<(u64, KeyEvent)>,
}

impl InputSystem {
    /// Create an input system from `(frame, event)` pairs. The pairs are
    /// sorted by frame; events sharing a frame keep their relative order.
    #[must_use]
    pub fn new(mut script: Vec<(u64, KeyEvent)>) -> Self {
        script.sort_by_key(|(frame, _)| *frame);
        Self {
            script: script.into(),
        }
    }

    /// The demo session: strafe, fire a few shots, restart, then quit.
    #[must_use]
    pub fn scripted() -> Self {
        Self::new(vec![
            (10, KeyEvent::pressed(KeyCode::Right)),
            (40, KeyEvent::released(KeyCode::Right)),
            (45, KeyEvent::pressed(KeyCode::Space)),
            (46, KeyEvent::released(KeyCode::Space)),
            (60, KeyEvent::pressed(KeyCode::Up)),
            (61, KeyEvent::pressed(KeyCode::Space)),
            (62, KeyEvent::released(KeyCode::Space)),
            (90, KeyEvent::released(KeyCode::Up)),
            (120, KeyEvent::pressed(KeyCode::Enter)),
            (121, KeyEvent::released(KeyCode::Enter)),
            (150, KeyEvent::pressed(KeyCode::Left)),
            (180, KeyEvent::released(KeyCode::Left)),
            (240, KeyEvent::pressed(KeyCode::Escape)),
        ])
    }

    /// Removes and returns every event due at or before `frame`.
    pub fn due(&mut self, frame: u64) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        while let Some(&(at, event)) = self.script.front() {
            if at > frame {
                break;
            }
            self.script.pop_front();
            events.push(event);
        }
        events
    }
}

impl System for InputSystem {
    fn name(&self) -> &str {
        "Input"
    }

    fn update(&mut self, _dt: f32, ctx: &mut Context<'_>) {
        for event in self.due(ctx.frame()) {
            debug!(frame = ctx.frame(), key = ?event.code, state = ?event.state, "key event");
            ctx.broadcast(Message::Input(event));
        }
    }
}
