//! Assembly of the starfield scene from a [`GameConfig`].
use crate::config::GameConfig;
use crate::ecs::{EntityId, Schedule, World};
use crate::factories::{player_factory, starfield_factory};
use crate::game_loop::{FrameContext, GameLoop};
use crate::systems::{
    ConfineSystem, MovementSystem, PlayerControlSystem, RenderingSystem, StarfieldSystem,
};
use crate::Result;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// A populated world together with the systems that animate it.
pub struct Scene {
    pub world: World,
    pub systems: Schedule<FrameContext>,
    pub stars: Vec<EntityId>,
    pub player: Option<EntityId>,
}

impl Scene {
    /// Hands the scene to a loop timed by `config`.
    #[must_use]
    pub fn into_game_loop(self, config: &GameConfig) -> GameLoop {
        GameLoop::new(self.world, self.systems, config.loop_config())
    }
}

/// Builds the starfield: the stars, the player if configured, and the systems in the order
/// starfield, player control, movement, confine, rendering.
///
/// ```
/// use starfield_engine::config::GameConfig;
/// use starfield_engine::scene::starfield_scene;
///
/// let config = GameConfig { seed: Some(1), ..GameConfig::default() };
/// let scene = starfield_scene(&config).unwrap();
///
/// assert_eq!(scene.stars.len(), 100);
/// assert_eq!(
///     scene.systems.names().collect::<Vec<_>>(),
///     ["starfield", "player_control", "movement", "confine", "rendering"]
/// );
/// ```
///
/// # Errors
///
/// Fails if the config is invalid or a factory rejects its parameters.
pub fn starfield_scene(config: &GameConfig) -> Result<Scene> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut world = World::new();
    let starfield = config.starfield();
    let stars = starfield_factory(&mut world, &starfield, &mut rng)?;
    let player = config
        .player
        .as_ref()
        .map(|player| player_factory(&mut world, player))
        .transpose()?;

    let mut systems = Schedule::new();
    systems.add_system(StarfieldSystem::new(
        &mut world,
        Vec2::new(starfield.area_width, starfield.area_height),
    ));
    systems.add_system(PlayerControlSystem::new(&mut world));
    systems.add_system(MovementSystem::new(&mut world));
    systems.add_system(ConfineSystem::new(&mut world, config.game_size()));
    systems.add_system(RenderingSystem::new(&mut world));

    info!(
        stars = stars.len(),
        player = player.is_some(),
        seed = ?config.seed,
        "starfield scene ready"
    );

    Ok(Scene {
        world,
        systems,
        stars,
        player,
    })
}
