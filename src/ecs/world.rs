use crate::ecs::{Bundle, CommandBuffer, ComponentSet, EcsError, Storage, View};
use tracing::{debug, warn};

/// A unique id for an entity. Ids start at 1, grow monotonically and are never reused, so
/// sorting by id yields creation order.
pub type EntityId = u64;

/// The main struct that holds all the game state. The storage is responsible for managing the
/// entities and components, the command buffer collects structural changes requested while a
/// view is being iterated. Systems borrow the world for the duration of one update.
pub struct World {
    pub storage: Storage,
    pub commands: CommandBuffer,
    next_entity: EntityId,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Storage::new(),
            commands: CommandBuffer::new(),
            next_entity: 1,
        }
    }

    /// Creates an entity holding every component of `bundle` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateComponent`] if the bundle names a component type twice. The
    /// world is not modified in that case and no id is consumed.
    pub fn create_entity<B: Bundle>(&mut self, bundle: B) -> Result<EntityId, EcsError> {
        let entity = self.next_entity;

        self.storage.spawn(entity, bundle)?;
        self.next_entity += 1;

        Ok(entity)
    }

    /// Adds a component to an entity, replacing a component of the same type if present.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity does not exist.
    pub fn add_component<ComponentType: 'static>(
        &mut self,
        entity: EntityId,
        component: ComponentType,
    ) -> Result<(), EcsError> {
        self.storage.add_component_to_entity(entity, component)
    }

    /// Removes a component from an entity and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity does not exist and
    /// [`EcsError::MissingComponent`] if it does not hold a `ComponentType`.
    pub fn remove_component<ComponentType: 'static>(
        &mut self,
        entity: EntityId,
    ) -> Result<ComponentType, EcsError> {
        self.storage.remove_component_from_entity(entity)
    }

    /// Destroys an entity and drops all of its components. The entity leaves every view at once.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity does not exist.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.storage.remove_entity(entity)
    }

    #[must_use]
    pub fn get<ComponentType: 'static>(&self, entity: EntityId) -> Option<&ComponentType> {
        self.storage.get(entity)
    }

    pub fn get_mut<ComponentType: 'static>(
        &mut self,
        entity: EntityId,
    ) -> Option<&mut ComponentType> {
        self.storage.get_mut(entity)
    }

    #[must_use]
    pub fn has_component<ComponentType: 'static>(&self, entity: EntityId) -> bool {
        self.storage.has_entity_component::<ComponentType>(entity)
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.storage.contains(entity)
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.storage.len()
    }

    /// Returns the live view of all entities holding every component of `Required`.
    ///
    /// ```
    /// use starfield_engine::ecs::World;
    ///
    /// struct Star;
    /// struct Position(f32, f32);
    ///
    /// let mut world = World::new();
    /// let view = world.archetype::<(Star, Position)>();
    /// assert!(world.view_entities(&view).is_empty());
    ///
    /// let star = world.create_entity((Star, Position(1.0, 2.0))).unwrap();
    /// world.create_entity((Position(0.0, 0.0),)).unwrap();
    /// assert_eq!(world.view_entities(&view), &[star]);
    /// ```
    pub fn archetype<Required: ComponentSet>(&mut self) -> View {
        self.archetype_without::<Required, ()>()
    }

    /// Returns the live view of all entities holding every component of `Required` and none of
    /// `Excluded`.
    pub fn archetype_without<Required: ComponentSet, Excluded: ComponentSet>(&mut self) -> View {
        let view = self.storage.register_view(
            Required::type_ids(),
            Excluded::type_ids(),
            Required::type_names(),
        );
        debug!(view = view.id, components = ?view.component_names(), "registered view");

        view
    }

    /// The entities of a view, in creation order.
    #[must_use]
    pub fn view_entities(&self, view: &View) -> &[EntityId] {
        self.storage.view_entities(view)
    }

    /// Applies all deferred commands in the order they were recorded and returns how many were
    /// applied. Commands that fail, e.g. because their entity has been destroyed in the meantime,
    /// are logged and dropped.
    pub fn flush(&mut self) -> usize {
        let mut applied = 0;

        for (label, command) in self.commands.take() {
            match command(self) {
                Ok(()) => applied += 1,
                Err(error) => warn!(command = %label, %error, "dropped deferred command"),
            }
        }

        applied
    }
}
