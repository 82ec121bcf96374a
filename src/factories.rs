//! Entity factories: build entities with their initial component set from plain parameters.
//!
//! Every factory validates its parameters before creating anything, so a rejected call leaves
//! the world unmodified.
use crate::color::PICO8;
use crate::components::{Confined, Direction, Player, Star, Transform, Velocity};
use crate::ecs::{EcsError, EntityId, World};
use glam::Vec2;
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("area must be positive and finite, got {width}x{height}")]
    InvalidArea { width: f32, height: f32 },

    #[error("speed must be non-negative and finite, got {0}")]
    InvalidSpeed(f32),

    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Parameters of [`starfield_factory`].
#[derive(Debug, Clone, PartialEq)]
pub struct StarfieldConfig {
    pub area_width: f32,
    pub area_height: f32,
    pub count: usize,
    /// Velocity given to every star. Stars are static when this is zero.
    pub drift: Vec2,
}

impl StarfieldConfig {
    #[must_use]
    pub fn new(area_width: f32, area_height: f32, count: usize) -> Self {
        Self {
            area_width,
            area_height,
            count,
            drift: Vec2::ZERO,
        }
    }
}

/// Spawns `config.count` stars. Positions are sampled uniformly from
/// `[0, area_width) x [0, area_height)`, colors uniformly from the PICO-8 palette. Stars have unit
/// scale and no rotation.
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use starfield_engine::ecs::World;
/// use starfield_engine::factories::{starfield_factory, StarfieldConfig};
///
/// let mut world = World::new();
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
///
/// let stars = starfield_factory(&mut world, &StarfieldConfig::new(127.0, 127.0, 100), &mut rng)
///     .unwrap();
/// assert_eq!(stars.len(), 100);
/// assert_eq!(world.entity_count(), 100);
/// ```
///
/// # Errors
///
/// Fails with [`FactoryError::InvalidArea`] if a dimension is not positive and finite, and with
/// [`FactoryError::InvalidSpeed`] if the drift is not finite.
pub fn starfield_factory<R: Rng + ?Sized>(
    world: &mut World,
    config: &StarfieldConfig,
    rng: &mut R,
) -> Result<Vec<EntityId>, FactoryError> {
    validate_area(config.area_width, config.area_height)?;
    if !config.drift.is_finite() {
        return Err(FactoryError::InvalidSpeed(config.drift.length()));
    }

    let mut stars = Vec::with_capacity(config.count);

    for _ in 0..config.count {
        let transform = Transform::from_position(Vec2::new(
            rng.gen_range(0.0..config.area_width),
            rng.gen_range(0.0..config.area_height),
        ));
        let star = Star {
            color: PICO8[rng.gen_range(0..PICO8.len())],
        };

        let entity = if config.drift == Vec2::ZERO {
            world.create_entity((transform, star))?
        } else {
            world.create_entity((transform, star, Velocity(config.drift)))?
        };
        stars.push(entity);
    }

    debug!(
        count = stars.len(),
        width = config.area_width,
        height = config.area_height,
        "spawned starfield"
    );

    Ok(stars)
}

/// Parameters of [`player_factory`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Top-left corner of the player in pixels.
    pub position: Vec2,
    /// Pixels per second along each axis.
    pub speed: f32,
    /// Collider size, used to keep the player inside the play area.
    pub size: Vec2,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: Vec2::new(60.0, 52.0),
            speed: 60.0,
            size: Vec2::new(8.0, 8.0),
        }
    }
}

/// Spawns the player: steered by input, moved along its direction and confined to the area.
///
/// # Errors
///
/// Fails if the speed is negative or not finite, or the size is not positive and finite.
pub fn player_factory(world: &mut World, config: &PlayerConfig) -> Result<EntityId, FactoryError> {
    if !config.speed.is_finite() || config.speed < 0.0 {
        return Err(FactoryError::InvalidSpeed(config.speed));
    }
    validate_area(config.size.x, config.size.y)?;

    let player = world.create_entity((
        Player,
        Transform::from_position(config.position),
        Direction::default(),
        Velocity(Vec2::splat(config.speed)),
        Confined { size: config.size },
    ))?;
    debug!(entity = player, "spawned player");

    Ok(player)
}

fn validate_area(width: f32, height: f32) -> Result<(), FactoryError> {
    let valid = |value: f32| value.is_finite() && value > 0.0;

    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(FactoryError::InvalidArea { width, height })
    }
}
