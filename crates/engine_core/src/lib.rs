//! # engine_core
//!
//! The engine's runtime: the [`EntityFactory`] that owns every entity, the
//! [`Message`] type systems talk through, and the [`CoreEngine`] scheduler
//! that drives systems through their Init/Update/Draw lifecycle.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use engine_core::{Context, CoreEngine, EngineConfig, System};
//!
//! struct Clock;
//!
//! impl System for Clock {
//!     fn name(&self) -> &str {
//!         "Clock"
//!     }
//!
//!     fn update(&mut self, _dt: f32, ctx: &mut Context<'_>) {
//!         if ctx.frame() == 600 {
//!             ctx.request_exit();
//!         }
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut engine = CoreEngine::new(EngineConfig::default());
//!     engine.add_system(Clock);
//!     engine.add_factory_system();
//!     engine.initialize()?;
//!     engine.game_loop();
//!     engine.destroy_systems();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod factory;
pub mod frame;
pub mod message;
pub mod snapshot;
pub mod system;
pub mod template;

pub use config::EngineConfig;
pub use context::{Context, RunState};
pub use engine::CoreEngine;
pub use error::FactoryError;
pub use factory::EntityFactory;
pub use frame::FrameRateController;
pub use message::{KeyCode, KeyEvent, KeyState, Message, MessageId};
pub use snapshot::{ComponentSnapshot, EntitySnapshot};
pub use system::System;
pub use template::{ArchetypeSet, EntityTemplate};
