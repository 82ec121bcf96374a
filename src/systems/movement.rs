use crate::components::{Direction, Transform, Velocity};
use crate::ecs::{Frame, Query, System, View, World};

/// Euler integration of positions, without interpolation or collision.
///
/// Entities with a [`Direction`] move by `direction * velocity * dt` component-wise, entities
/// without one move by `velocity * dt`.
pub struct MovementSystem {
    free: View,
    directed: View,
}

impl MovementSystem {
    pub fn new(world: &mut World) -> Self {
        Self {
            free: world.archetype_without::<(Transform, Velocity), (Direction,)>(),
            directed: world.archetype::<(Transform, Direction, Velocity)>(),
        }
    }
}

impl<C> System<C> for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(&mut self, world: &mut World, frame: &mut Frame<'_, C>) {
        let dt = frame.dt;

        for (_, (transform, velocity)) in world
            .storage
            .query_two_mut::<Transform, Velocity>(&self.free)
        {
            transform.position += velocity.0 * dt;
        }

        for (_, (transform, direction, velocity)) in world
            .storage
            .query_three_mut::<Transform, Direction, Velocity>(&self.directed)
        {
            transform.position += direction.0 * velocity.0 * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::InputState;
    use crate::systems::test_support::run_once;
    use glam::Vec2;

    #[test]
    fn integrates_velocity_over_frame_time() {
        let mut world = World::new();
        let mut system = MovementSystem::new(&mut world);
        let entity = world
            .create_entity((Transform::default(), Velocity(Vec2::new(10.0, 0.0))))
            .unwrap();

        run_once(&mut system, &mut world, 0.5, InputState::default());

        let position = world.get::<Transform>(entity).unwrap().position;
        assert_eq!(position.x, 5.0);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn directed_entities_move_along_their_direction() {
        let mut world = World::new();
        let mut system = MovementSystem::new(&mut world);
        let entity = world
            .create_entity((
                Transform::from_position(Vec2::new(10.0, 10.0)),
                Direction(Vec2::new(-1.0, 1.0)),
                Velocity(Vec2::new(60.0, 30.0)),
            ))
            .unwrap();

        run_once(&mut system, &mut world, 0.25, InputState::default());

        assert_eq!(
            world.get::<Transform>(entity).unwrap().position,
            Vec2::new(-5.0, 17.5)
        );
    }

    #[test]
    fn entities_without_velocity_stay_put() {
        let mut world = World::new();
        let mut system = MovementSystem::new(&mut world);
        let entity = world
            .create_entity((Transform::from_position(Vec2::new(3.0, 4.0)),))
            .unwrap();

        run_once(&mut system, &mut world, 1.0, InputState::default());

        assert_eq!(
            world.get::<Transform>(entity).unwrap().position,
            Vec2::new(3.0, 4.0)
        );
    }
}
