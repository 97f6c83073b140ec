//! Game state stack.
//!
//! States are plain names (`"play"`, `"pause"`, ...). `PushState` stacks a
//! state, `ChangeState` replaces the top one and clears the scene, and
//! `PopState` returns to the state underneath. Popping the last state ends
//! the game.

use engine_core::{Context, Message, System};
use tracing::info;

/// What a state message did to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The message was not a state message.
    None,
    /// A state was pushed or popped.
    Stacked,
    /// The top state was replaced; the scene must be cleared.
    Replaced,
    /// The last state was popped; the game is over.
    Emptied,
}

/// Keeps the stack of active game states.
#[derive(Debug)]
pub struct GameStateSystem {
    stack: Vec<String>,
}

impl GameStateSystem {
    /// Create a state stack holding `initial`.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            stack: vec![initial.into()],
        }
    }

    /// The active state, if any.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    /// Stack depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Applies a state message to the stack.
    pub fn apply(&mut self, message: &Message) -> Transition {
        match message {
            Message::PushState(name) => {
                self.stack.push(name.clone());
                Transition::Stacked
            }
            Message::ChangeState(name) => {
                self.stack.pop();
                self.stack.push(name.clone());
                Transition::Replaced
            }
            Message::PopState => {
                self.stack.pop();
                if self.stack.is_empty() {
                    Transition::Emptied
                } else {
                    Transition::Stacked
                }
            }
            _ => Transition::None,
        }
    }
}

impl System for GameStateSystem {
    fn name(&self) -> &str {
        "GameState"
    }

    fn update(&mut self, _dt: f32, _ctx: &mut Context<'_>) {}

    fn send_message(&mut self, message: &Message, ctx: &mut Context<'_>) {
        match self.apply(message) {
            Transition::None => return,
            Transition::Stacked => {}
            Transition::Replaced => ctx.factory_mut().destroy_all_entities(),
            Transition::Emptied => ctx.request_exit(),
        }
        info!(state = ?self.current(), depth = self.depth(), "game state changed");
    }
}
