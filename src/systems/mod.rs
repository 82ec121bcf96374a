//! The systems of the starfield scene. Each system registers the views it needs when it is
//! constructed and iterates them on every update.
mod confine;
mod movement;
mod player;
mod rendering;
mod starfield;

pub use confine::ConfineSystem;
pub use movement::MovementSystem;
pub use player::PlayerControlSystem;
pub use rendering::RenderingSystem;
pub use starfield::StarfieldSystem;
