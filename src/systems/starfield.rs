use crate::components::{Star, Transform};
use crate::ecs::{Frame, Query, System, View, World};
use glam::Vec2;

/// Keeps stars inside the starfield area: a star that drifted out on one edge re-enters on the
/// opposite edge. Static stars are left untouched.
pub struct StarfieldSystem {
    area: Vec2,
    stars: View,
}

impl StarfieldSystem {
    /// # Panics
    ///
    /// Panics if an axis of `area` is not a positive, finite size.
    pub fn new(world: &mut World, area: Vec2) -> Self {
        assert!(
            area.is_finite() && area.cmpgt(Vec2::ZERO).all(),
            "Starfield area must be positive, got {area}."
        );

        Self {
            area,
            stars: world.archetype::<(Star, Transform)>(),
        }
    }
}

/// Euclidean remainder into `[0, size)`.
fn wrap(value: f32, size: f32) -> f32 {
    let wrapped = value.rem_euclid(size);

    // rounding can yield `size` itself for tiny negative values
    if wrapped >= size {
        0.0
    } else {
        wrapped
    }
}

impl<C> System<C> for StarfieldSystem {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn update(&mut self, world: &mut World, _frame: &mut Frame<'_, C>) {
        let area = self.area;

        for (_, transform) in world.storage.query_one_mut::<Transform>(&self.stars) {
            transform.position = Vec2::new(
                wrap(transform.position.x, area.x),
                wrap(transform.position.y, area.y),
            );
        }
    }
}
