//! The [`System`] trait.

use crate::context::Context;
use crate::message::Message;

/// A top-level engine subsystem driven once per frame by the engine.
///
/// Systems run in registration order. Dropping a system is its teardown; the
/// engine drops systems in reverse registration order.
pub trait System {
    /// A human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Called once, in registration order, before the first frame. Systems
    /// owning component kinds register their creators here.
    ///
    /// # Errors
    ///
    /// Any error aborts engine initialisation.
    fn init(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Advances the system by `dt` seconds.
    fn update(&mut self, dt: f32, ctx: &mut Context<'_>);

    /// Called right after this system's `update` each frame.
    fn draw(&mut self, _ctx: &mut Context<'_>) {}

    /// Handles a broadcast message.
    fn send_message(&mut self, _message: &Message, _ctx: &mut Context<'_>) {}
}
