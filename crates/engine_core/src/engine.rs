//! The core engine: system scheduler and message fan-out.
//!
//! The engine owns an ordered list of systems, one of which is the
//! [`EntityFactory`]. Each frame it calls every system's `update` then `draw`,
//! in registration order. Messages are fanned out synchronously to every
//! system in the same order.
//!
//! ## Message delivery
//!
//! [`CoreEngine::broadcast_message`] delivers immediately. A message a system
//! broadcasts through its [`Context`] is queued and delivered as soon as that
//! system's call returns, before the next system runs. Messages broadcast
//! while handling a message join the back of the same queue, so a handler can
//! never recurse into another handler. Each drain delivers at most
//! [`EngineConfig::max_dispatch`] messages (never fewer than one); the rest
//! are dropped with a warning.
//!
//! ## Ordering contract
//!
//! `init` runs in registration order, so a system that builds entities in its
//! own `init` must be registered after every system whose component creators
//! it needs. Teardown drops systems in reverse registration order.

use anyhow::Context as _;
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::context::{Context, MessageBus, RunState};
use crate::factory::EntityFactory;
use crate::frame::FrameRateController;
use crate::message::Message;
use crate::system::System;

/// One entry in the engine's system order.
enum Slot {
    /// The engine's own entity factory.
    Factory,
    /// A registered system.
    System(Box<dyn System>),
}

impl Slot {
    fn name(&self) -> &str {
        match self {
            Slot::Factory => EntityFactory::NAME,
            Slot::System(system) => system.name(),
        }
    }
}

/// Drives the frame loop and owns every system.
pub struct CoreEngine {
    config: EngineConfig,
    factory: EntityFactory,
    slots: Vec<Slot>,
    bus: MessageBus,
    frame_rate: FrameRateController,
    initialized: bool,
}

impl CoreEngine {
    /// Create an engine with no systems besides its entity factory.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let frame_rate = FrameRateController::new(&config);
        Self {
            config,
            factory: EntityFactory::new(),
            slots: Vec::new(),
            bus: MessageBus::new(),
            frame_rate,
            initialized: false,
        }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Appends a system to the run order. Systems can only be added before
    /// [`CoreEngine::initialize`].
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        if self.initialized {
            warn!(system = system.name(), "systems cannot be added after initialisation");
            return;
        }
        debug!(system = system.name(), position = self.slots.len(), "added system");
        self.slots.push(Slot::System(Box::new(system)));
    }

    /// Places the entity factory at this point in the run order. If this is
    /// never called, [`CoreEngine::initialize`] appends the factory last.
    pub fn add_factory_system(&mut self) {
        if self.initialized || self.has_factory_slot() {
            warn!("entity factory is already in the system order");
            return;
        }
        debug!(position = self.slots.len(), "added entity factory");
        self.slots.push(Slot::Factory);
    }

    fn has_factory_slot(&self) -> bool {
        self.slots.iter().any(|slot| matches!(slot, Slot::Factory))
    }

    /// Names of the registered systems, in run order.
    #[must_use]
    pub fn system_names(&self) -> Vec<&str> {
        self.slots.iter().map(Slot::name).collect()
    }

    /// The entity factory.
    #[must_use]
    pub fn factory(&self) -> &EntityFactory {
        &self.factory
    }

    /// The entity factory, mutably.
    pub fn factory_mut(&mut self) -> &mut EntityFactory {
        &mut self.factory
    }

    /// The current run state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.bus.state
    }

    /// Returns `true` while the game loop should keep running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bus.state == RunState::Running
    }

    /// Number of frames run so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.bus.frame
    }

    /// Calls every system's `init` in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first system error, annotated with the system's name.
    /// Systems after the failing one are not initialised.
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        if !self.has_factory_slot() {
            self.slots.push(Slot::Factory);
        }

        for index in 0..self.slots.len() {
            let Self {
                slots, factory, bus, ..
            } = self;
            match &mut slots[index] {
                Slot::Factory => factory.init(),
                Slot::System(system) => {
                    let name = system.name().to_owned();
                    system
                        .init(&mut Context::new(factory, bus))
                        .with_context(|| format!("failed to initialise system '{name}'"))?;
                }
            }
            info!(system = self.slots[index].name(), "initialised system");
            self.dispatch_pending();
        }

        self.initialized = true;
        Ok(())
    }

    /// Fans a message out to every system, in registration order, before
    /// returning. [`Message::Exit`] stops the engine before any system sees it.
    pub fn broadcast_message(&mut self, message: Message) {
        self.bus.post(message);
        self.dispatch_pending();
    }

    /// Delivers queued messages until the queue is empty or the dispatch
    /// budget is spent.
    fn dispatch_pending(&mut self) {
        let Self {
            slots,
            factory,
            bus,
            config,
            ..
        } = self;

        let budget = config.max_dispatch.max(1);
        let mut delivered = 0;
        while let Some(message) = bus.queue.pop_front() {
            if delivered == budget {
                warn!(
                    dropped = bus.queue.len() + 1,
                    budget,
                    "message dispatch budget exhausted, dropping queued messages"
                );
                bus.queue.clear();
                break;
            }
            delivered += 1;

            trace!(message = ?message.id(), "dispatching message");
            for slot in slots.iter_mut() {
                match slot {
                    Slot::Factory => factory.handle_message(&message),
                    Slot::System(system) => {
                        system.send_message(&message, &mut Context::new(factory, bus));
                    }
                }
            }
        }
    }

    /// Runs one frame: `update` then `draw` on every system in order.
    pub fn run_frame(&mut self, dt: f32) {
        self.bus.frame += 1;
        trace!(frame = self.bus.frame, dt, "frame start");

        for index in 0..self.slots.len() {
            {
                let Self {
                    slots, factory, bus, ..
                } = self;
                match &mut slots[index] {
                    Slot::Factory => {
                        factory.update(dt);
                    }
                    Slot::System(system) => system.update(dt, &mut Context::new(factory, bus)),
                }
            }
            self.dispatch_pending();

            {
                let Self {
                    slots, factory, bus, ..
                } = self;
                if let Slot::System(system) = &mut slots[index] {
                    system.draw(&mut Context::new(factory, bus));
                }
            }
            self.dispatch_pending();
        }
    }

    /// Runs frames until exit is requested or the frame limit is reached.
    ///
    /// The run state is checked once per iteration, at the top, so the frame
    /// during which exit is requested still completes.
    pub fn game_loop(&mut self) {
        if !self.initialized {
            warn!("game loop started before initialisation");
        }
        if self.bus.state == RunState::Idle {
            self.bus.state = RunState::Running;
        }

        info!(
            frame_rate = self.config.frame_rate,
            max_frames = self.config.max_frames,
            systems = self.slots.len(),
            "starting game loop"
        );

        while self.is_active() {
            let dt = self.frame_rate.begin_frame();
            self.run_frame(dt);
            self.frame_rate.end_frame(self.bus.frame);

            if self.config.max_frames > 0 && self.bus.frame >= self.config.max_frames {
                info!(frames = self.bus.frame, "frame limit reached");
                if self.bus.state == RunState::Running {
                    self.bus.state = RunState::Stopping;
                }
            }
        }

        self.bus.state = RunState::Stopped;
        info!(frames = self.bus.frame, "game loop stopped");
    }

    /// Drops every system in reverse registration order. The factory's turn
    /// frees every entity and component creator.
    pub fn destroy_systems(&mut self) {
        while let Some(slot) = self.slots.pop() {
            let name = slot.name().to_owned();
            match slot {
                Slot::Factory => self.factory.shutdown(),
                Slot::System(system) => drop(system),
            }
            info!(system = %name, "destroyed system");
        }
    }
}

impl Default for CoreEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Drop for CoreEngine {
    fn drop(&mut self) {
        self.destroy_systems();
    }
}
