//! # engine_component
//!
//! The entity-component composition layer.
//!
//! This crate provides:
//!
//! - [`ComponentTypeId`]: the closed, ordered set of component kinds.
//! - [`Component`]: the capability trait every attached component exposes.
//! - [`ComponentKind`]: the authoring trait concrete component structs implement.
//! - [`Entity`]: an identified, sorted composition of components.
//! - [`ComponentCreator`] / [`CreatorRegistry`]: key → component factories.

pub mod component;
pub mod creator;
pub mod entity;
pub mod error;

pub use component::{Attached, Component, ComponentKind, ComponentTypeId};
pub use creator::{ComponentCreator, CreatorRegistry};
pub use entity::{Entity, EntityId};
pub use error::{ComponentError, CreatorError, EntityError};
