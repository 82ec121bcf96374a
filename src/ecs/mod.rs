//! # ECS Core
//! This module contains the entity-component-system kernel of the engine. It is responsible for
//! storing entities and their components and for handing out live, filtered views over them.
//!
//! We use the following terminology:
//! - `Entity`: An entity is a unique identifier that groups components together. It is a simple
//!  [number](EntityId) that is never reused.
//! - `Component`: A component is a piece of data that is attached to an entity. Any type whose
//! members are `'static` can be attached as a component, since the storage uses a dynamic type
//! system keyed by [`TypeId`](std::any::TypeId).
//! - [`View`]: A view is the live set of entities that currently hold every component of a
//! required set (and none of an optional excluded set). Views are registered once and kept up to
//! date by the storage on every structural change. They iterate in entity creation order.
//! - [`System`]: A system operates on the entities of one or more views once per frame. Systems
//! are run in registration order by a [`Schedule`].
//! - [`World`]: The world owns all entities and components. The actual housekeeping is done by
//! the [`Storage`] struct. Structural changes requested while a view is being iterated are
//! recorded in the world's [`CommandBuffer`] and applied once the pass is over.
mod archetype;
mod bundle;
mod command_buffer;
mod entity_builder;
mod error;
mod query;
mod storage;
mod system;
mod view;
mod world;

pub use bundle::{Bundle, ComponentSet};
pub use command_buffer::CommandBuffer;
pub use entity_builder::EntityBuilder;
pub use error::EcsError;
pub use query::Query;
pub use storage::Storage;
pub use system::{Frame, Schedule, System};
pub use view::View;
pub use world::*;
