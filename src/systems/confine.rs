use crate::components::{Confined, Direction, Transform};
use crate::ecs::{Frame, Query, System, View, World};
use glam::Vec2;

/// Keeps [`Confined`] entities inside `[0, area - size]` on both axes. An entity that hit an
/// edge and has a [`Direction`] is pointed back into the area on that axis.
pub struct ConfineSystem {
    area: Vec2,
    steered: View,
    passive: View,
}

impl ConfineSystem {
    /// # Panics
    ///
    /// Panics if an axis of `area` is not a positive, finite size.
    pub fn new(world: &mut World, area: Vec2) -> Self {
        assert!(
            area.is_finite() && area.cmpgt(Vec2::ZERO).all(),
            "Confinement area must be positive, got {area}."
        );

        Self {
            area,
            steered: world.archetype::<(Transform, Confined, Direction)>(),
            passive: world.archetype_without::<(Transform, Confined), (Direction,)>(),
        }
    }
}

/// Clamps `value` into `[0, max]`. Returns the heading that points back inside if it was clamped.
fn clamp_axis(value: &mut f32, max: f32) -> Option<f32> {
    if *value < 0.0 {
        *value = 0.0;
        Some(1.0)
    } else if *value > max {
        *value = max;
        Some(-1.0)
    } else {
        None
    }
}

impl<C> System<C> for ConfineSystem {
    fn name(&self) -> &'static str {
        "confine"
    }

    fn update(&mut self, world: &mut World, _frame: &mut Frame<'_, C>) {
        let area = self.area;

        for (_, (transform, confined, direction)) in world
            .storage
            .query_three_mut::<Transform, Confined, Direction>(&self.steered)
        {
            let max = (area - confined.size).max(Vec2::ZERO);

            if let Some(heading) = clamp_axis(&mut transform.position.x, max.x) {
                direction.0.x = heading;
            }
            if let Some(heading) = clamp_axis(&mut transform.position.y, max.y) {
                direction.0.y = heading;
            }
        }

        for (_, (transform, confined)) in world
            .storage
            .query_two_mut::<Transform, Confined>(&self.passive)
        {
            let max = (area - confined.size).max(Vec2::ZERO);

            clamp_axis(&mut transform.position.x, max.x);
            clamp_axis(&mut transform.position.y, max.y);
        }
    }
}
