use crate::ecs::storage::{ComponentVec, EntityRow};
use crate::ecs::EntityId;
use std::any::{Any, TypeId};

#[allow(clippy::module_name_repetitions)]
pub type ArchetypeId = usize;

/// A table of all entities that share exactly the same set of component types.
///
/// `types` is kept sorted and `component_types[i]` always stores elements of `types[i]`. Every
/// column has one element per entry in `entities`, so a row index addresses the same entity in
/// every column.
pub struct Archetype {
    pub(crate) id: ArchetypeId,
    pub(crate) entities: Vec<EntityId>,
    pub(crate) component_types: Vec<Box<dyn ComponentVec>>,
    pub(crate) types: Vec<TypeId>,
}

/// Result of moving one entity row from a source archetype into a target archetype.
pub(crate) struct Migration {
    /// The entity that was swapped into the vacated source row, if any.
    pub(crate) moved: Option<EntityId>,
    /// Components of the source row that have no column in the target.
    pub(crate) leftovers: Vec<Box<dyn Any>>,
}

impl Archetype {
    pub(crate) fn new(id: ArchetypeId, mut component_types: Vec<Box<dyn ComponentVec>>) -> Self {
        component_types.sort_by_key(|column| column.element_type_id());
        let types = component_types
            .iter()
            .map(|column| column.element_type_id())
            .collect();

        Self {
            id,
            entities: Vec::new(),
            component_types,
            types,
        }
    }

    pub(crate) fn new_from_add<ComponentType: 'static>(from_archetype: &Self, id: usize) -> Self {
        let mut component_types: Vec<Box<dyn ComponentVec>> = from_archetype
            .component_types
            .iter()
            .map(|column| column.new_empty())
            .collect();

        // We allow a panic, since if this fails, then we have a bug in the ECS design.
        assert!(!component_types
            .iter()
            .any(|component_type| component_type.as_any().is::<Vec<ComponentType>>()));

        component_types.push(Box::<Vec<ComponentType>>::default());

        Self::new(id, component_types)
    }

    pub(crate) fn new_from_remove<ComponentType: 'static>(
        from_archetype: &Self,
        id: usize,
    ) -> Self {
        let component_types: Vec<Box<dyn ComponentVec>> = from_archetype
            .component_types
            .iter()
            .filter(|column| !column.as_any().is::<Vec<ComponentType>>())
            .map(|column| column.new_empty())
            .collect();

        // We allow a panic, since if this fails, then we have a bug in the ECS design.
        assert_eq!(
            component_types.len() + 1,
            from_archetype.component_types.len(),
            "Component type not found."
        );

        Self::new(id, component_types)
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn has_type(&self, type_id: TypeId) -> bool {
        self.types.binary_search(&type_id).is_ok()
    }

    /// True if the archetype holds every type in `required` and none in `excluded`.
    pub(crate) fn matches(&self, required: &[TypeId], excluded: &[TypeId]) -> bool {
        required.iter().all(|&type_id| self.has_type(type_id))
            && !excluded.iter().any(|&type_id| self.has_type(type_id))
    }

    pub(crate) fn get_components<ComponentType: 'static>(&self) -> Option<&[ComponentType]> {
        let index = self.types.binary_search(&TypeId::of::<ComponentType>()).ok()?;

        self.component_types[index]
            .as_any()
            .downcast_ref::<Vec<ComponentType>>()
            .map(Vec::as_slice)
    }

    pub(crate) fn get_components_mut<ComponentType: 'static>(
        &mut self,
    ) -> Option<&mut Vec<ComponentType>> {
        let index = self.types.binary_search(&TypeId::of::<ComponentType>()).ok()?;

        self.component_types[index]
            .as_any_mut()
            .downcast_mut::<Vec<ComponentType>>()
    }

    pub(crate) fn push_component<ComponentType: 'static>(&mut self, component: ComponentType) {
        let column: &mut Vec<ComponentType> = self
            .get_components_mut()
            .expect("Component type not found.");

        column.push(component);
    }

    /// Swap-removes a row from every column, dropping its components. Returns the entity that
    /// now occupies `row`, if the removed row was not the last one.
    pub(crate) fn swap_remove_row(&mut self, row: EntityRow) -> Option<EntityId> {
        self.component_types.iter_mut().for_each(|column| {
            column.swap_remove(row);
        });
        self.entities.swap_remove(row);

        self.entities.get(row).copied()
    }
}

/// Aligns two archetypes and migrates the row of the source archetype to the end of the target
/// archetype. This is used when moving an entity to a new archetype.
///
/// Columns shared by both archetypes are moved over. Source columns without a counterpart in the
/// target are swap-removed as well and returned as leftovers, so every source column stays
/// aligned. Target columns without a counterpart in the source are left untouched; the caller is
/// responsible for pushing the missing component.
pub(crate) fn align_and_migrate_archetypes(
    source: &mut Archetype,
    target: &mut Archetype,
    source_entity_row: EntityRow,
) -> Migration {
    let mut leftovers = Vec::new();
    let mut j = 0;

    for i in 0..source.types.len() {
        while j < target.types.len() && target.types[j] < source.types[i] {
            j += 1;
        }

        let col_source = &mut source.component_types[i];

        if j < target.types.len() && target.types[j] == source.types[i] {
            col_source.migrate_element(source_entity_row, &mut *target.component_types[j]);
            j += 1;
        } else {
            leftovers.push(col_source.take_element(source_entity_row));
        }
    }

    let entity = source.entities.swap_remove(source_entity_row);
    target.entities.push(entity);

    Migration {
        moved: source.entities.get(source_entity_row).copied(),
        leftovers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archetype_with_rows(id: ArchetypeId, ints: Vec<i32>, floats: Vec<f32>) -> Archetype {
        let entities = (0..ints.len() as EntityId).map(|e| e + 1).collect();
        let mut archetype = Archetype::new(id, vec![Box::new(ints), Box::new(floats)]);
        archetype.entities = entities;
        archetype
    }

    #[test]
    fn new_sorts_columns_by_type_id() {
        let archetype = Archetype::new(
            0,
            vec![Box::<Vec<f32>>::default(), Box::<Vec<i32>>::default()],
        );

        let mut type_ids_sorted = vec![TypeId::of::<i32>(), TypeId::of::<f32>()];
        type_ids_sorted.sort();

        assert_eq!(archetype.types, type_ids_sorted);
        assert_eq!(
            archetype.component_types[0].element_type_id(),
            type_ids_sorted[0]
        );
        assert_eq!(
            archetype.component_types[1].element_type_id(),
            type_ids_sorted[1]
        );
    }

    #[test]
    fn new_from_add_sets_correct_data() {
        let archetype = Archetype::new(0, vec![Box::<Vec<i32>>::default()]);

        let new_archetype = Archetype::new_from_add::<f32>(&archetype, 1);

        let mut type_ids_sorted = vec![TypeId::of::<i32>(), TypeId::of::<f32>()];
        type_ids_sorted.sort();

        assert_eq!(new_archetype.id, 1);
        assert_eq!(new_archetype.types, type_ids_sorted);
        assert_eq!(new_archetype.component_types.len(), 2);
        assert_eq!(new_archetype.len(), 0);
    }

    #[test]
    fn new_from_remove_sets_correct_data() {
        let archetype = Archetype::new(
            0,
            vec![Box::<Vec<i32>>::default(), Box::<Vec<f32>>::default()],
        );

        let new_archetype = Archetype::new_from_remove::<f32>(&archetype, 1);

        assert_eq!(new_archetype.types, vec![TypeId::of::<i32>()]);
        assert_eq!(new_archetype.component_types.len(), 1);
        assert!(new_archetype.component_types[0].is_empty());
    }

    #[test]
    fn matches_checks_required_and_excluded_types() {
        let archetype = Archetype::new(
            0,
            vec![Box::<Vec<i32>>::default(), Box::<Vec<f32>>::default()],
        );

        assert!(archetype.matches(&[TypeId::of::<i32>()], &[]));
        assert!(archetype.matches(&[TypeId::of::<i32>(), TypeId::of::<f32>()], &[]));
        assert!(!archetype.matches(&[TypeId::of::<u8>()], &[]));
        assert!(!archetype.matches(&[TypeId::of::<i32>()], &[TypeId::of::<f32>()]));
        assert!(archetype.matches(&[], &[TypeId::of::<u8>()]));
    }

    #[test]
    fn swap_remove_row_keeps_columns_aligned() {
        let mut archetype = archetype_with_rows(0, vec![1, 2, 3], vec![1.0, 2.0, 3.0]);

        let moved = archetype.swap_remove_row(0);

        assert_eq!(moved, Some(3));
        assert_eq!(archetype.entities, vec![3, 2]);
        assert_eq!(archetype.get_components::<i32>().unwrap(), &[3, 2]);
        assert_eq!(archetype.get_components::<f32>().unwrap(), &[3.0, 2.0]);

        assert_eq!(archetype.swap_remove_row(1), None);
        assert_eq!(archetype.entities, vec![3]);
    }

    #[test]
    fn align_and_migrate_archetypes_correctly_migrates_archetypes() {
        let mut source = Archetype::new(0, vec![Box::new(vec![1, 2, 3])]);
        source.entities = vec![10, 11, 12];

        let mut target = archetype_with_rows(1, vec![1, 2, 3], vec![1.0, 2.0, 3.0]);

        let migration = align_and_migrate_archetypes(&mut source, &mut target, 1);

        assert_eq!(migration.moved, Some(12));
        assert!(migration.leftovers.is_empty());
        assert_eq!(source.get_components::<i32>().unwrap(), &[1, 3]);
        assert_eq!(source.entities, vec![10, 12]);
        assert_eq!(target.get_components::<f32>().unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(target.get_components::<i32>().unwrap(), &[1, 2, 3, 2]);
        assert_eq!(target.entities, vec![1, 2, 3, 11]);
    }

    #[test]
    fn align_and_migrate_archetypes_returns_components_missing_in_target() {
        let mut source = archetype_with_rows(0, vec![1, 2, 3], vec![1.0, 2.0, 3.0]);
        let mut target = Archetype::new(1, vec![Box::new(Vec::<i32>::new())]);

        let mut migration = align_and_migrate_archetypes(&mut source, &mut target, 1);

        assert_eq!(migration.moved, Some(3));
        assert_eq!(migration.leftovers.len(), 1);
        let leftover = migration.leftovers.pop().unwrap().downcast::<f32>().unwrap();
        assert_eq!(*leftover, 2.0);

        assert_eq!(source.get_components::<i32>().unwrap(), &[1, 3]);
        assert_eq!(source.get_components::<f32>().unwrap(), &[1.0, 3.0]);
        assert_eq!(target.get_components::<i32>().unwrap(), &[2]);
        assert_eq!(target.entities, vec![2]);
    }
}
