use crate::components::{Star, Transform};
use crate::ecs::{Frame, Query, System, View, World};
use crate::game_loop::FrameContext;
use crate::platform::DrawRequest;
use glam::Vec2;

/// Issues one draw request per star, in view order. Positions are snapped to whole pixels by
/// truncation.
pub struct RenderingSystem {
    stars: View,
}

impl RenderingSystem {
    pub fn new(world: &mut World) -> Self {
        Self {
            stars: world.archetype::<(Star, Transform)>(),
        }
    }
}

impl System<FrameContext> for RenderingSystem {
    fn name(&self) -> &'static str {
        "rendering"
    }

    fn update(&mut self, world: &mut World, frame: &mut Frame<'_, FrameContext>) {
        for (_, (star, transform)) in world.storage.query_two::<Star, Transform>(&self.stars) {
            frame.context.draws.push(DrawRequest {
                position: Vec2::new(transform.position.x.trunc(), transform.position.y.trunc()),
                rotation: transform.rotation,
                scale: transform.scale,
                color: star.color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgba, PICO8};
    use crate::platform::InputState;
    use crate::systems::test_support::run_once;

    #[test]
    fn draws_stars_in_creation_order_with_snapped_positions() {
        let mut world = World::new();
        let mut system = RenderingSystem::new(&mut world);

        world
            .create_entity((
                Transform::from_position(Vec2::new(3.9, 7.2)),
                Star { color: PICO8[8] },
            ))
            .unwrap();
        world
            .create_entity((Transform::from_position(Vec2::new(1.0, 1.0)),))
            .unwrap();
        world
            .create_entity((
                Star { color: PICO8[1] },
                Transform {
                    position: Vec2::new(0.5, 10.0),
                    scale: Vec2::new(2.0, 2.0),
                    rotation: 45.0,
                },
            ))
            .unwrap();

        let draws = run_once(&mut system, &mut world, 0.0, InputState::default());

        assert_eq!(
            draws.as_slice(),
            &[
                DrawRequest {
                    position: Vec2::new(3.0, 7.0),
                    rotation: 0.0,
                    scale: Vec2::ONE,
                    color: Rgba::new(255, 0, 77, 255),
                },
                DrawRequest {
                    position: Vec2::new(0.0, 10.0),
                    rotation: 45.0,
                    scale: Vec2::new(2.0, 2.0),
                    color: Rgba::new(29, 43, 83, 255),
                },
            ]
        );
    }
}
