//! Messages broadcast between systems.
//!
//! A [`Message`] is a transient value: it is delivered synchronously to every
//! system and never retained afterwards. The engine interprets only
//! [`Message::Exit`]; every other kind is up to the systems that care.

use engine_component::EntityId;
use engine_math::Vec2;
use serde::{Deserialize, Serialize};

/// Discriminant of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageId {
    Exit,
    DestroyEntity,
    DestroyAllEntities,
    PushState,
    ChangeState,
    PopState,
    Motion,
    Input,
    PlaySound,
}

/// Physical key identifiers produced by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    Char(char),
}

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A discrete key-state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The key that changed.
    pub code: KeyCode,
    /// Its new state.
    pub state: KeyState,
}

impl KeyEvent {
    /// A key-down event.
    #[must_use]
    pub const fn pressed(code: KeyCode) -> Self {
        Self {
            code,
            state: KeyState::Pressed,
        }
    }

    /// A key-up event.
    #[must_use]
    pub const fn released(code: KeyCode) -> Self {
        Self {
            code,
            state: KeyState::Released,
        }
    }
}

/// An event payload fanned out to every system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Stop the game loop after the current frame.
    Exit,
    /// Queue an entity for deferred destruction.
    DestroyEntity(EntityId),
    /// Destroy every live entity immediately.
    DestroyAllEntities,
    /// Push a game state onto the state stack.
    PushState(String),
    /// Replace the top of the state stack.
    ChangeState(String),
    /// Pop the top of the state stack.
    PopState,
    /// Set an entity's velocity.
    Motion { entity: EntityId, velocity: Vec2 },
    /// A key changed state.
    Input(KeyEvent),
    /// Play a named audio cue.
    PlaySound(String),
}

impl Message {
    /// Returns this message's discriminant.
    #[must_use]
    pub fn id(&self) -> MessageId {
        match self {
            Message::Exit => MessageId::Exit,
            Message::DestroyEntity(_) => MessageId::DestroyEntity,
            Message::DestroyAllEntities => MessageId::DestroyAllEntities,
            Message::PushState(_) => MessageId::PushState,
            Message::ChangeState(_) => MessageId::ChangeState,
            Message::PopState => MessageId::PopState,
            Message::Motion { .. } => MessageId::Motion,
            Message::Input(_) => MessageId::Input,
            Message::PlaySound(_) => MessageId::PlaySound,
        }
    }

    /// Returns `true` for the request-exit message.
    #[must_use]
    pub fn is_exit(&self) -> bool {
        matches!(self, Message::Exit)
    }
}
