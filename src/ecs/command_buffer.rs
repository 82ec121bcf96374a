use crate::ecs::{Bundle, EcsError, EntityId, World};
use std::any::type_name;
use std::fmt;

type Command = Box<dyn FnOnce(&mut World) -> Result<(), EcsError>>;

/// A FIFO queue of structural changes that are applied to the world later.
///
/// Views may not change while they are being iterated, so systems record entity creation,
/// component additions and removals and entity destruction here instead. The world applies the
/// recorded commands in order with [`World::flush`], which the [`Schedule`](crate::ecs::Schedule)
/// calls after every system.
///
/// ```
/// use starfield_engine::ecs::{Query, World};
///
/// struct Frozen;
///
/// let mut world = World::new();
/// let first = world.create_entity((1,)).unwrap();
/// let second = world.create_entity((2,)).unwrap();
///
/// let view = world.archetype_without::<(i32,), (Frozen,)>();
///
/// let mut visited = 0;
/// for (entity, _) in world.storage.query_one::<i32>(&view) {
///     world.commands.add_component(entity, Frozen);
///     visited += 1;
/// }
/// assert_eq!(visited, 2);
///
/// world.flush();
/// assert!(world.view_entities(&view).is_empty());
/// # let _ = (first, second);
/// ```
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<(String, Command)>,
}

impl CommandBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the creation of an entity. The id is assigned when the command is applied.
    pub fn create_entity<B: Bundle>(&mut self, bundle: B) {
        self.push(format!("create entity {}", type_name::<B>()), move |world| {
            world.create_entity(bundle).map(|_| ())
        });
    }

    pub fn add_component<ComponentType: 'static>(
        &mut self,
        entity: EntityId,
        component: ComponentType,
    ) {
        self.push(
            format!("add `{}` to entity {entity}", type_name::<ComponentType>()),
            move |world| world.add_component(entity, component),
        );
    }

    /// Records the removal of a component. The removed value is dropped when the command is
    /// applied.
    pub fn remove_component<ComponentType: 'static>(&mut self, entity: EntityId) {
        self.push(
            format!(
                "remove `{}` from entity {entity}",
                type_name::<ComponentType>()
            ),
            move |world| world.remove_component::<ComponentType>(entity).map(drop),
        );
    }

    pub fn destroy_entity(&mut self, entity: EntityId) {
        self.push(format!("destroy entity {entity}"), move |world| {
            world.destroy_entity(entity)
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Discards every recorded command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub(crate) fn take(&mut self) -> Vec<(String, Command)> {
        std::mem::take(&mut self.commands)
    }

    fn push(
        &mut self,
        label: String,
        command: impl FnOnce(&mut World) -> Result<(), EcsError> + 'static,
    ) {
        self.commands.push((label, Box::new(command)));
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.commands.iter().map(|(label, _)| label))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_recorded_without_touching_the_world() {
        let mut world = World::new();
        let entity = world.create_entity((1,)).unwrap();

        world.commands.add_component(entity, 2.0f32);
        world.commands.create_entity((3,));

        assert_eq!(world.commands.len(), 2);
        assert!(!world.has_component::<f32>(entity));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn flush_applies_commands_in_order() {
        let mut world = World::new();
        let entity = world.create_entity((1,)).unwrap();

        world.commands.add_component(entity, 2.0f32);
        world.commands.remove_component::<f32>(entity);
        world.commands.add_component(entity, 3.0f32);
        world.commands.create_entity((4, 4.0f32));

        assert_eq!(world.flush(), 4);
        assert!(world.commands.is_empty());
        assert_eq!(world.get::<f32>(entity), Some(&3.0));
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn failed_commands_are_dropped() {
        let mut world = World::new();
        let entity = world.create_entity((1,)).unwrap();

        world.commands.destroy_entity(entity);
        world.commands.add_component(entity, 2.0f32);
        world.commands.create_entity((5,));

        // the add fails because the entity is gone, the rest still applies
        assert_eq!(world.flush(), 2);
        assert!(!world.contains(entity));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn clear_discards_commands() {
        let mut buffer = CommandBuffer::new();
        buffer.destroy_entity(1);
        buffer.remove_component::<i32>(2);

        assert_eq!(
            format!("{buffer:?}"),
            "[\"destroy entity 1\", \"remove `i32` from entity 2\"]"
        );

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
