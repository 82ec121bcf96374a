//! A small real-time simulation engine built around an archetype ECS.
//!
//! The [`ecs`] module holds the entity store, views and the system schedule. The remaining
//! modules build a starfield scene on top of it and drive it with a fixed/variable timestep
//! [`game_loop`] against an abstract [`platform`].
pub mod color;
pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod factories;
pub mod game_loop;
pub mod platform;
pub mod scene;
pub mod systems;

pub use error::{Error, Result};
