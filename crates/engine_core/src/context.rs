//! Per-call context handed to systems.
//!
//! A [`Context`] gives a system access to the entity factory and to the
//! message bus for the duration of one `init`, `update`, `draw` or
//! `send_message` call.

use std::collections::VecDeque;

use tracing::{info, trace};

use crate::factory::EntityFactory;
use crate::message::Message;

/// The engine's run state.
///
/// ```text
/// Idle ──game_loop──▶ Running ──Exit──▶ Stopping ──loop check──▶ Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not yet looping.
    Idle,
    /// The game loop is running frames.
    Running,
    /// Exit was requested; the loop stops at its next iteration check.
    Stopping,
    /// The game loop has returned.
    Stopped,
}

/// Messages waiting to be fanned out, plus the run state an exit request flips.
#[derive(Debug)]
pub(crate) struct MessageBus {
    pub(crate) queue: VecDeque<Message>,
    pub(crate) state: RunState,
    pub(crate) frame: u64,
}

impl MessageBus {
    pub(crate) fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            state: RunState::Idle,
            frame: 0,
        }
    }

    /// Queues a message for fan-out. An exit request stops the engine
    /// immediately, before any system sees the message.
    pub(crate) fn post(&mut self, message: Message) {
        if message.is_exit() && matches!(self.state, RunState::Idle | RunState::Running) {
            info!(frame = self.frame, "exit requested");
            self.state = RunState::Stopping;
        }
        trace!(message = ?message.id(), "queued message");
        self.queue.push_back(message);
    }
}

/// Access to engine services from inside a system call.
pub struct Context<'a> {
    factory: &'a mut EntityFactory,
    bus: &'a mut MessageBus,
}

impl<'a> Context<'a> {
    pub(crate) fn new(factory: &'a mut EntityFactory, bus: &'a mut MessageBus) -> Self {
        Self { factory, bus }
    }

    /// The entity factory.
    #[must_use]
    pub fn factory(&self) -> &EntityFactory {
        &*self.factory
    }

    /// The entity factory, mutably.
    pub fn factory_mut(&mut self) -> &mut EntityFactory {
        &mut *self.factory
    }

    /// Broadcasts a message to every system.
    ///
    /// The message is delivered, in registration order, as soon as the
    /// current system call returns and before any other system runs.
    /// [`Message::Exit`] additionally stops the engine right away.
    pub fn broadcast(&mut self, message: Message) {
        self.bus.post(message);
    }

    /// Shorthand for broadcasting [`Message::Exit`].
    pub fn request_exit(&mut self) {
        self.broadcast(Message::Exit);
    }

    /// Returns `true` while the engine is running and no exit was requested.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bus.state == RunState::Running
    }

    /// The number of the frame being run (1-based; 0 during initialisation).
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.bus.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_flips_state_on_post() {
        let mut bus = MessageBus::new();
        bus.state = RunState::Running;
        bus.post(Message::PopState);
        assert_eq!(bus.state, RunState::Running);
        bus.post(Message::Exit);
        assert_eq!(bus.state, RunState::Stopping);
        assert_eq!(bus.queue.len(), 2);
    }

    #[test]
    fn test_context_broadcast_queues() {
        let mut factory = EntityFactory::new();
        let mut bus = MessageBus::new();
        bus.state = RunState::Running;
        {
            let mut ctx = Context::new(&mut factory, &mut bus);
            assert!(ctx.is_active());
            ctx.broadcast(Message::PlaySound("ping".into()));
            ctx.request_exit();
            assert!(!ctx.is_active());
            ctx.factory_mut().create_empty_entity();
        }
        assert_eq!(
            bus.queue.into_iter().collect::<Vec<_>>(),
            vec![Message::PlaySound("ping".into()), Message::Exit]
        );
        assert_eq!(factory.entity_count(), 1);
    }
}
