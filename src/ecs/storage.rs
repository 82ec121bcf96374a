use crate::ecs::archetype::{align_and_migrate_archetypes, Archetype, ArchetypeId, Migration};
use crate::ecs::bundle::Bundle;
use crate::ecs::view::{View, ViewIndex};
use crate::ecs::{EcsError, EntityId};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the per-storage ids that tie views to the storage that registered them.
static NEXT_STORAGE_ID: AtomicU64 = AtomicU64::new(1);

pub trait ComponentVec: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn new_empty(&self) -> Box<dyn ComponentVec>;
    fn len(&self) -> usize;
    #[allow(dead_code)]
    fn is_empty(&self) -> bool;
    fn element_type_id(&self) -> TypeId;
    fn migrate_element(&mut self, index: usize, other: &mut dyn ComponentVec);
    fn swap_remove(&mut self, index: usize);
    fn take_element(&mut self, index: usize) -> Box<dyn Any>;
}

impl<T: 'static> ComponentVec for Vec<T> {
    fn as_any(&self) -> &dyn Any {
        self as &dyn Any
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self as &mut dyn Any
    }

    fn new_empty(&self) -> Box<dyn ComponentVec> {
        Box::<Self>::default()
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn is_empty(&self) -> bool {
        self.is_empty()
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn migrate_element(&mut self, index: usize, other: &mut dyn ComponentVec) {
        let element = self.swap_remove(index);
        if let Some(other) = other.as_any_mut().downcast_mut::<Self>() {
            other.push(element);
        } else {
            panic!(
                "Type mismatch during migration: expected {:?}",
                std::any::type_name::<T>()
            );
        }
    }

    fn swap_remove(&mut self, index: usize) {
        self.swap_remove(index);
    }

    fn take_element(&mut self, index: usize) -> Box<dyn Any> {
        Box::new(self.swap_remove(index))
    }
}

/// An index to the row in an archetype that stores the components of an entity.
pub type EntityRow = usize;

/// A record of an entity in an archetype. This is used inside the `entity_index` to keep track of
///  a) which archetype an entity belongs to and
///  b) which row in the archetype the components of the entity are stored
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntityRecord {
    pub(crate) archetype_id: ArchetypeId,
    pub(crate) entity_row: EntityRow,
}

/// The storage struct is responsible for managing the entities and components of the game world.
/// `Archetypes` are used to group entities with the same components together, but are generally
/// only used internally. Every structural change is mirrored into the registered view indices, so
/// views never have to rescan the storage.
pub struct Storage {
    id: u64,
    pub(crate) archetypes: HashMap<ArchetypeId, Archetype>,
    pub(crate) component_index: HashMap<TypeId, Vec<ArchetypeId>>,
    pub(crate) entity_index: HashMap<EntityId, EntityRecord>,
    pub(crate) views: Vec<ViewIndex>,
    view_lookup: HashMap<(Vec<TypeId>, Vec<TypeId>), usize>,
    archetype_id_counter: ArchetypeId,
}

impl Storage {
    /// Places a new entity with the components of `bundle`. The bundle is validated before
    /// anything is touched, so a malformed bundle leaves the storage unmodified.
    pub(crate) fn spawn<B: Bundle>(&mut self, entity: EntityId, bundle: B) -> Result<(), EcsError> {
        B::validate()?;
        debug_assert!(
            !self.entity_index.contains_key(&entity),
            "Entity {entity} spawned twice."
        );

        let mut wanted_component_types = B::type_ids();
        wanted_component_types.sort();

        let archetype_id = if let Some(id) =
            self.find_archetype_id_by_type_ids(&wanted_component_types)
        {
            id
        } else {
            let id = self.archetype_id_counter;
            self.register_archetype(Archetype::new(id, B::empty_columns()));
            id
        };

        let archetype = self
            .archetypes
            .get_mut(&archetype_id)
            .expect("Internal storage error. Invalid Archetype ID.");
        archetype.entities.push(entity);
        bundle.push_into(archetype);

        let record = EntityRecord {
            archetype_id,
            entity_row: archetype.len() - 1,
        };
        self.entity_index.insert(entity, record);
        self.sync_views(entity);

        Ok(())
    }

    /// Remove an entity from the Storage. This swap removes the entity row from its archetype,
    /// updates the record of the entity that took its place and drops it from every view.
    pub fn remove_entity(&mut self, entity: EntityId) -> Result<(), EcsError> {
        let record = self
            .entity_index
            .remove(&entity)
            .ok_or(EcsError::EntityNotFound(entity))?;

        let archetype = self
            .archetypes
            .get_mut(&record.archetype_id)
            .expect("Internal storage error. Entity index points to invalid archetype id.");

        // we swap_remove the entity row, so the entity in the last row is moved to the removed
        // row, meaning we have to update the entity index for the moved entity
        if let Some(moved_entity) = archetype.swap_remove_row(record.entity_row) {
            self.set_entity_row(moved_entity, record.entity_row);
        }

        self.sync_views(entity);

        Ok(())
    }

    /// Adds a component to an entity. If the entity already holds a component of the same type,
    /// the value is replaced in place. Otherwise the entity is moved to the archetype for its new
    /// set of components, which is created if none exists yet.
    pub fn add_component_to_entity<ComponentType: 'static>(
        &mut self,
        entity: EntityId,
        component: ComponentType,
    ) -> Result<(), EcsError> {
        let record = self.record(entity)?;

        let current_archetype = &self.archetypes[&record.archetype_id];

        if current_archetype.has_type(TypeId::of::<ComponentType>()) {
            let column = self
                .archetypes
                .get_mut(&record.archetype_id)
                .and_then(Archetype::get_components_mut::<ComponentType>)
                .expect("Internal storage error. Component column not found.");
            column[record.entity_row] = component;
            return Ok(());
        }

        let new_archetype_id = {
            let mut wanted_component_types = current_archetype.types.clone();
            wanted_component_types.push(TypeId::of::<ComponentType>());
            wanted_component_types.sort();

            if let Some(id) = self.find_archetype_id_by_type_ids(&wanted_component_types) {
                id
            } else {
                let id = self.archetype_id_counter;
                let new_archetype = Archetype::new_from_add::<ComponentType>(current_archetype, id);
                self.register_archetype(new_archetype);
                id
            }
        };

        self.move_entity_to_new_archetype(entity, record, new_archetype_id);

        let new_archetype = self
            .archetypes
            .get_mut(&new_archetype_id)
            .expect("Internal storage error. Invalid Archetype ID.");
        new_archetype.push_component(component);

        self.sync_views(entity);

        Ok(())
    }

    /// Removes a component from an entity and returns it. The entity is moved to the archetype
    /// for its remaining components, which is created if none exists yet.
    pub fn remove_component_from_entity<ComponentType: 'static>(
        &mut self,
        entity: EntityId,
    ) -> Result<ComponentType, EcsError> {
        let record = self.record(entity)?;

        let current_archetype = &self.archetypes[&record.archetype_id];

        if !current_archetype.has_type(TypeId::of::<ComponentType>()) {
            return Err(EcsError::MissingComponent {
                entity,
                component: type_name::<ComponentType>(),
            });
        }

        let new_archetype_id = {
            // filter out the type id of the component we want to remove
            let wanted_component_types = current_archetype
                .types
                .iter()
                .copied()
                .filter(|type_id| *type_id != TypeId::of::<ComponentType>())
                .collect::<Vec<_>>();

            if let Some(id) = self.find_archetype_id_by_type_ids(&wanted_component_types) {
                id
            } else {
                let id = self.archetype_id_counter;
                let new_archetype =
                    Archetype::new_from_remove::<ComponentType>(current_archetype, id);
                self.register_archetype(new_archetype);
                id
            }
        };

        let mut leftovers = self.move_entity_to_new_archetype(entity, record, new_archetype_id);
        self.sync_views(entity);

        let removed = leftovers
            .pop()
            .and_then(|component| component.downcast::<ComponentType>().ok())
            .expect("Internal storage error. Removed component lost during migration.");

        Ok(*removed)
    }

    /// Returns the number of entities in the storage.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_index.is_empty()
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entity_index.contains_key(&entity)
    }

    #[must_use]
    pub fn has_entity_component<ComponentType: 'static>(&self, entity: EntityId) -> bool {
        self.get_archetype_for_entity(entity)
            .is_some_and(|archetype| archetype.has_type(TypeId::of::<ComponentType>()))
    }

    #[must_use]
    pub fn get<ComponentType: 'static>(&self, entity: EntityId) -> Option<&ComponentType> {
        let record = self.entity_index.get(&entity)?;

        self.archetypes[&record.archetype_id]
            .get_components::<ComponentType>()
            .map(|column| &column[record.entity_row])
    }

    pub fn get_mut<ComponentType: 'static>(
        &mut self,
        entity: EntityId,
    ) -> Option<&mut ComponentType> {
        let record = *self.entity_index.get(&entity)?;

        self.archetypes
            .get_mut(&record.archetype_id)?
            .get_components_mut::<ComponentType>()
            .map(|column| &mut column[record.entity_row])
    }

    /// Registers a view for the given required and excluded component types, or returns the
    /// already registered one. A new view is populated once from the entity index and from then
    /// on kept up to date incrementally.
    pub(crate) fn register_view(
        &mut self,
        required: Vec<TypeId>,
        excluded: Vec<TypeId>,
        names: Vec<&'static str>,
    ) -> View {
        let mut required = required;
        required.sort();
        required.dedup();

        let mut excluded = excluded;
        excluded.sort();
        excluded.dedup();

        let key = (required.clone(), excluded.clone());

        let id = if let Some(&id) = self.view_lookup.get(&key) {
            id
        } else {
            let mut index = ViewIndex::new(required.clone(), excluded.clone());

            let mut members = self
                .entity_index
                .iter()
                .filter(|(_, record)| {
                    self.archetypes[&record.archetype_id].matches(&required, &excluded)
                })
                .map(|(&entity, _)| entity)
                .collect::<Vec<_>>();
            members.sort_unstable();
            index.entities = members;

            let id = self.views.len();
            self.views.push(index);
            self.view_lookup.insert(key, id);
            id
        };

        View::new(self.id, id, required, excluded, names)
    }

    /// Returns the entities of a view, in creation order.
    ///
    /// # Panics
    ///
    /// Panics if the view was registered with a different storage.
    #[must_use]
    pub fn view_entities(&self, view: &View) -> &[EntityId] {
        &self.view_index(view).entities
    }

    pub(crate) fn view_index(&self, view: &View) -> &ViewIndex {
        assert_eq!(
            view.storage, self.id,
            "View was registered with a different world."
        );

        let index = self
            .views
            .get(view.id)
            .expect("View was registered with a different world.");

        assert!(
            index.is_for(view),
            "View was registered with a different world."
        );

        index
    }

    fn record(&self, entity: EntityId) -> Result<EntityRecord, EcsError> {
        self.entity_index
            .get(&entity)
            .copied()
            .ok_or(EcsError::EntityNotFound(entity))
    }

    fn set_entity_row(&mut self, entity: EntityId, entity_row: EntityRow) {
        self.entity_index
            .get_mut(&entity)
            .expect("Internal storage error. Moved entity missing from index.")
            .entity_row = entity_row;
    }

    /// Brings every registered view up to date with the current component set of `entity`.
    fn sync_views(&mut self, entity: EntityId) {
        let types = self
            .entity_index
            .get(&entity)
            .map(|record| self.archetypes[&record.archetype_id].types.as_slice());

        for view in &mut self.views {
            view.sync(entity, types);
        }
    }

    fn find_archetype_id_by_type_ids(&self, type_ids: &[TypeId]) -> Option<ArchetypeId> {
        let Some(first) = type_ids.first() else {
            return self
                .archetypes
                .values()
                .find(|archetype| archetype.types.is_empty())
                .map(|archetype| archetype.id);
        };

        self.component_index
            .get(first)?
            .iter()
            .find(|&&id| self.archetypes[&id].types == type_ids)
            .copied()
    }

    /// Moves an entity row into another archetype and fixes up both entity records. Returns the
    /// components that have no column in the new archetype.
    fn move_entity_to_new_archetype(
        &mut self,
        entity: EntityId,
        current_record: EntityRecord,
        new_archetype_id: ArchetypeId,
    ) -> Vec<Box<dyn Any>> {
        // we remove the elements in order to avoid borrowing issues
        let mut current_archetype = self
            .archetypes
            .remove(&current_record.archetype_id)
            .expect("Internal storage error. Invalid Archetype ID.");
        let mut new_archetype = self
            .archetypes
            .remove(&new_archetype_id)
            .expect("Internal storage error. Invalid Archetype ID.");

        let Migration { moved, leftovers } = align_and_migrate_archetypes(
            &mut current_archetype,
            &mut new_archetype,
            current_record.entity_row,
        );

        let new_record = EntityRecord {
            archetype_id: new_archetype_id,
            entity_row: new_archetype.len() - 1,
        };

        self.archetypes
            .insert(current_archetype.id, current_archetype);
        self.archetypes.insert(new_archetype.id, new_archetype);

        if let Some(moved_entity) = moved {
            self.set_entity_row(moved_entity, current_record.entity_row);
        }
        self.entity_index.insert(entity, new_record);

        leftovers
    }

    fn register_archetype(&mut self, archetype: Archetype) {
        let archetype_id = archetype.id;

        archetype.types.iter().for_each(|&type_id| {
            self.component_index
                .entry(type_id)
                .or_default()
                .push(archetype_id);
        });

        self.archetypes.insert(archetype_id, archetype);
        self.archetype_id_counter += 1;
    }

    /// Get the archetype for an entity. Returns None if the entity does not exist.
    fn get_archetype_for_entity(&self, entity: EntityId) -> Option<&Archetype> {
        let archetype_id = self.entity_index.get(&entity)?.archetype_id;

        Some(&self.archetypes[&archetype_id])
    }

    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_STORAGE_ID.fetch_add(1, Ordering::Relaxed),
            archetypes: HashMap::new(),
            component_index: HashMap::new(),
            entity_index: HashMap::new(),
            views: Vec::new(),
            view_lookup: HashMap::new(),
            archetype_id_counter: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_of(storage: &mut Storage, required: Vec<TypeId>) -> View {
        storage.register_view(required, Vec::new(), Vec::new())
    }

    #[test]
    fn test_component_element_type_id() {
        let component_vec = Box::<Vec<i32>>::default();
        assert_eq!(component_vec.element_type_id(), TypeId::of::<i32>());

        let component_vec = Box::<Vec<String>>::default();
        assert_eq!(component_vec.element_type_id(), TypeId::of::<String>());
    }

    #[test]
    fn spawn_creates_archetype_and_updates_index() {
        let mut storage = Storage::new();

        storage.spawn(1, (5, 42.0f32)).unwrap();
        storage.spawn(2, (42.0f32, 7)).unwrap();

        // both bundles describe the same set of types
        assert_eq!(storage.archetypes.len(), 1);
        assert_eq!(storage.component_index.len(), 2);
        assert_eq!(storage.len(), 2);

        let record = storage.entity_index[&2];
        assert_eq!(record.entity_row, 1);
        assert_eq!(storage.get::<i32>(2), Some(&7));
        assert_eq!(storage.get::<f32>(1), Some(&42.0));
    }

    #[test]
    fn spawn_with_duplicate_types_leaves_storage_untouched() {
        let mut storage = Storage::new();

        let result = storage.spawn(1, (5, 6));

        assert_eq!(result, Err(EcsError::DuplicateComponent("i32")));
        assert!(storage.is_empty());
        assert!(storage.archetypes.is_empty());
    }

    #[test]
    fn spawn_empty_bundle_uses_empty_archetype() {
        let mut storage = Storage::new();

        storage.spawn(1, ()).unwrap();
        storage.spawn(2, ()).unwrap();

        assert_eq!(storage.archetypes.len(), 1);
        assert!(storage.contains(1));
        assert!(!storage.has_entity_component::<i32>(1));
    }

    #[test]
    fn add_component_to_entity_correctly_creates_archetype_and_updates_index() {
        let mut storage = Storage::new();

        let entity = 1;
        storage.spawn(entity, (5,)).unwrap();
        assert_eq!(storage.archetypes.len(), 1);

        storage.add_component_to_entity(entity, 42.0f32).unwrap();

        assert!(storage.has_entity_component::<i32>(entity));
        assert!(storage.has_entity_component::<f32>(entity));
        assert_eq!(storage.archetypes.len(), 2);
        assert_eq!(storage.component_index[&TypeId::of::<i32>()].len(), 2);
        assert_eq!(storage.component_index[&TypeId::of::<f32>()].len(), 1);

        // check if component was migrated to new archetype
        let first_archetype = &storage.archetypes[&0];
        assert_eq!(first_archetype.len(), 0);
        assert_eq!(first_archetype.component_types[0].len(), 0);

        let record = storage.entity_index[&entity];
        assert_eq!(record.archetype_id, 1);
        assert_eq!(record.entity_row, 0);
        assert_eq!(storage.get::<i32>(entity), Some(&5));
        assert_eq!(storage.get::<f32>(entity), Some(&42.0));
    }

    #[test]
    fn add_component_to_entity_replaces_existing_component() {
        let mut storage = Storage::new();

        storage.spawn(1, (5,)).unwrap();
        storage.add_component_to_entity(1, 6).unwrap();

        assert_eq!(storage.archetypes.len(), 1);
        assert_eq!(storage.get::<i32>(1), Some(&6));
    }

    #[test]
    fn add_component_to_unknown_entity_fails() {
        let mut storage = Storage::new();

        assert_eq!(
            storage.add_component_to_entity(3, 5),
            Err(EcsError::EntityNotFound(3))
        );
    }

    #[test]
    fn add_component_updates_record_of_swapped_entity() {
        let mut storage = Storage::new();

        storage.spawn(1, (1,)).unwrap();
        storage.spawn(2, (2,)).unwrap();
        storage.spawn(3, (3,)).unwrap();

        // entity 1 leaves row 0, entity 3 takes its place
        storage.add_component_to_entity(1, 1.0f32).unwrap();

        assert_eq!(storage.entity_index[&3].entity_row, 0);
        assert_eq!(storage.get::<i32>(3), Some(&3));
        assert_eq!(storage.get::<i32>(2), Some(&2));
        assert_eq!(storage.get::<i32>(1), Some(&1));
    }

    #[test]
    fn remove_component_from_entity_returns_component() {
        let mut storage = Storage::new();

        let entity = 1;
        storage.spawn(entity, (5, 42.0f32)).unwrap();

        let removed = storage.remove_component_from_entity::<f32>(entity);

        assert_eq!(removed, Ok(42.0));
        assert!(!storage.has_entity_component::<f32>(entity));
        assert_eq!(storage.get::<i32>(entity), Some(&5));
        assert_eq!(storage.archetypes.len(), 2);
    }

    #[test]
    fn remove_component_from_entity_fails_if_component_does_not_exist() {
        let mut storage = Storage::new();

        storage.spawn(1, (5,)).unwrap();

        assert_eq!(
            storage.remove_component_from_entity::<f32>(1),
            Err(EcsError::MissingComponent {
                entity: 1,
                component: "f32"
            })
        );
        assert_eq!(storage.archetypes.len(), 1);
    }

    #[test]
    fn remove_component_reuses_existing_archetype() {
        let mut storage = Storage::new();

        storage.spawn(1, (5,)).unwrap();
        storage.spawn(2, (6, 1.0f32)).unwrap();

        storage.remove_component_from_entity::<f32>(2).unwrap();

        assert_eq!(storage.archetypes.len(), 2);
        assert_eq!(storage.entity_index[&2].archetype_id, 0);
        assert_eq!(storage.entity_index[&2].entity_row, 1);
        assert_eq!(storage.get::<i32>(2), Some(&6));
    }

    #[test]
    fn remove_entity_updates_record_of_swapped_entity() {
        let mut storage = Storage::new();

        storage.spawn(1, (5,)).unwrap();
        storage.spawn(2, (2,)).unwrap();

        storage.remove_entity(1).unwrap();

        assert_eq!(storage.len(), 1);
        assert!(!storage.contains(1));
        assert_eq!(storage.entity_index[&2].entity_row, 0);
        assert_eq!(storage.get::<i32>(2), Some(&2));
        assert_eq!(storage.remove_entity(1), Err(EcsError::EntityNotFound(1)));
    }

    #[test]
    fn register_view_populates_from_existing_entities() {
        let mut storage = Storage::new();

        storage.spawn(1, (5, 1.0f32)).unwrap();
        storage.spawn(2, (6,)).unwrap();
        storage.spawn(3, (1.0f32, 7)).unwrap();

        let view = view_of(&mut storage, vec![TypeId::of::<i32>(), TypeId::of::<f32>()]);

        assert_eq!(storage.view_entities(&view), &[1, 3]);
    }

    #[test]
    fn register_view_returns_the_same_view_for_the_same_types() {
        let mut storage = Storage::new();

        let first = view_of(&mut storage, vec![TypeId::of::<i32>(), TypeId::of::<f32>()]);
        let second = view_of(&mut storage, vec![TypeId::of::<f32>(), TypeId::of::<i32>()]);

        assert_eq!(first, second);
        assert_eq!(storage.views.len(), 1);
    }

    #[test]
    fn views_follow_structural_changes_in_creation_order() {
        let mut storage = Storage::new();
        let view = view_of(&mut storage, vec![TypeId::of::<i32>(), TypeId::of::<f32>()]);

        storage.spawn(1, (5,)).unwrap();
        storage.spawn(2, (6, 1.0f32)).unwrap();
        assert_eq!(storage.view_entities(&view), &[2]);

        storage.add_component_to_entity(1, 2.0f32).unwrap();
        assert_eq!(storage.view_entities(&view), &[1, 2]);

        storage.remove_component_from_entity::<i32>(2).unwrap();
        assert_eq!(storage.view_entities(&view), &[1]);

        storage.remove_entity(1).unwrap();
        assert!(storage.view_entities(&view).is_empty());
    }

    #[test]
    fn excluded_types_keep_entities_out_of_view() {
        let mut storage = Storage::new();
        let view = storage.register_view(
            vec![TypeId::of::<i32>()],
            vec![TypeId::of::<f32>()],
            Vec::new(),
        );

        storage.spawn(1, (5,)).unwrap();
        storage.spawn(2, (6, 1.0f32)).unwrap();
        assert_eq!(storage.view_entities(&view), &[1]);

        storage.add_component_to_entity(1, 2.0f32).unwrap();
        storage.remove_component_from_entity::<f32>(2).unwrap();
        assert_eq!(storage.view_entities(&view), &[2]);
    }

    #[test]
    #[should_panic(expected = "View was registered with a different world.")]
    fn view_from_other_storage_is_rejected() {
        let mut first = Storage::new();
        let second = Storage::new();

        let view = view_of(&mut first, vec![TypeId::of::<i32>()]);
        let _ = second.view_entities(&view);
    }

    #[test]
    #[should_panic(expected = "View was registered with a different world.")]
    fn view_with_matching_slot_in_other_storage_is_rejected() {
        let mut first = Storage::new();
        let mut second = Storage::new();
        second.spawn(1, (7i32,)).unwrap();

        // both storages hold an `(i32,)` view in slot 0
        let view = view_of(&mut first, vec![TypeId::of::<i32>()]);
        let _ = view_of(&mut second, vec![TypeId::of::<i32>()]);

        let _ = second.view_entities(&view);
    }
}
