use crate::ecs::{EntityId, World};
use std::marker::PhantomData;

#[derive(Default, Clone)]
pub struct NoComponents;
#[derive(Default, Clone)]
pub struct HasComponents;

/// Builder pattern for entities. Provides a fail-safe API for entity-creation using the Builder and
/// [TypeState](https://cliffle.com/blog/rust-typestate) patterns, which ensure that entities are
/// built with at least one component. The entity is created with its first component and moved
/// to the matching archetype as further components are attached.
///
/// Attaching a component type twice replaces the earlier value.
///
/// Usage:
/// ```
/// use starfield_engine::ecs::World;
///
/// struct Name(&'static str);
/// struct Health(i32);
///
/// let mut world = World::new();
///
/// let player = world.build_entity()
///     .with_component::<Name>(Name("Player"))
///     .with_component::<Health>(Health(100))
///     .build();
///
/// assert_eq!(world.get::<Health>(player).map(|health| health.0), Some(100));
/// ```
pub struct EntityBuilder<'a, C> {
    world: &'a mut World,
    entity_id: Option<EntityId>,
    marker_has_components: PhantomData<C>,
}

impl<'a> EntityBuilder<'a, NoComponents> {
    fn new(world: &'a mut World) -> Self {
        Self {
            world,
            entity_id: None,
            marker_has_components: PhantomData,
        }
    }

    pub fn with_component<C: 'static>(self, component: C) -> EntityBuilder<'a, HasComponents> {
        // a single component bundle can not contain duplicates
        let entity_id = self
            .world
            .create_entity((component,))
            .expect("A single component is always a valid bundle.");

        EntityBuilder {
            world: self.world,
            entity_id: Some(entity_id),
            marker_has_components: PhantomData,
        }
    }
}

impl EntityBuilder<'_, HasComponents> {
    #[must_use]
    pub fn with_component<C: 'static>(self, component: C) -> Self {
        self.world
            .add_component(self.id(), component)
            .expect("Entity under construction disappeared.");

        self
    }

    #[must_use]
    pub fn build(self) -> EntityId {
        self.id()
    }

    fn id(&self) -> EntityId {
        self.entity_id
            .expect("HasComponents builder always holds an entity id.")
    }
}

impl World {
    pub fn build_entity(&mut self) -> EntityBuilder<NoComponents> {
        EntityBuilder::new(self)
    }
}
