//! Component types of the starfield scene. Components are plain data; behavior lives in
//! [`systems`](crate::systems).
use crate::color::Rgba;
use glam::Vec2;

/// Placement of an entity in pixel space. Rotation is in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
}

impl Transform {
    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

/// Units per second. Without a [`Direction`] this is the full velocity vector, with one it is
/// the speed along each axis of the direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity(pub Vec2);

/// A unit-less heading, each axis usually in `-1.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Direction(pub Vec2);

/// Marks an entity as a star and carries its decoded color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Star {
    pub color: Rgba,
}

/// Marks the entity steered by the directional input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Player;

/// Keeps an entity of the given size inside the play area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confined {
    pub size: Vec2,
}
