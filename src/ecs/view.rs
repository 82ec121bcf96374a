use crate::ecs::EntityId;
use std::any::TypeId;

/// A handle to a live, filtered set of entities.
///
/// A view is defined by the component types an entity must hold and the component types it must
/// not hold. It is obtained once from [`World::archetype`](crate::ecs::World::archetype) and stays
/// valid for the lifetime of that world: the storage keeps its membership up to date on every
/// structural change, so re-iterating it every frame never rescans the storage. Iteration follows
/// entity creation order.
///
/// A view whose components never co-occur is simply empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub(crate) storage: u64,
    pub(crate) id: usize,
    pub(crate) required: Vec<TypeId>,
    pub(crate) excluded: Vec<TypeId>,
    names: Vec<&'static str>,
}

impl View {
    pub(crate) fn new(
        storage: u64,
        id: usize,
        required: Vec<TypeId>,
        excluded: Vec<TypeId>,
        names: Vec<&'static str>,
    ) -> Self {
        Self {
            storage,
            id,
            required,
            excluded,
            names,
        }
    }

    /// True if every entity of the view is guaranteed to hold a `ComponentType`.
    #[must_use]
    pub fn requires<ComponentType: 'static>(&self) -> bool {
        self.required.contains(&TypeId::of::<ComponentType>())
    }

    /// True if no entity of the view may hold a `ComponentType`.
    #[must_use]
    pub fn excludes<ComponentType: 'static>(&self) -> bool {
        self.excluded.contains(&TypeId::of::<ComponentType>())
    }

    /// Names of the required components, as given when the view was created.
    #[must_use]
    pub fn component_names(&self) -> &[&'static str] {
        &self.names
    }
}

/// Membership index of one registered view. `entities` is kept sorted, which is creation order
/// since entity ids are handed out monotonically.
pub(crate) struct ViewIndex {
    required: Vec<TypeId>,
    excluded: Vec<TypeId>,
    pub(crate) entities: Vec<EntityId>,
}

impl ViewIndex {
    pub(crate) fn new(required: Vec<TypeId>, excluded: Vec<TypeId>) -> Self {
        Self {
            required,
            excluded,
            entities: Vec::new(),
        }
    }

    pub(crate) fn is_for(&self, view: &View) -> bool {
        self.required == view.required && self.excluded == view.excluded
    }

    fn matches(&self, types: &[TypeId]) -> bool {
        self.required.iter().all(|type_id| types.contains(type_id))
            && !self.excluded.iter().any(|type_id| types.contains(type_id))
    }

    /// Updates membership of `entity` given its current component types, or `None` if the entity
    /// no longer exists.
    pub(crate) fn sync(&mut self, entity: EntityId, types: Option<&[TypeId]>) {
        let should_contain = types.is_some_and(|types| self.matches(types));

        match self.entities.binary_search(&entity) {
            Ok(position) if !should_contain => {
                self.entities.remove(position);
            }
            Err(position) if should_contain => {
                self.entities.insert(position, entity);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_inserts_in_creation_order() {
        let mut index = ViewIndex::new(vec![TypeId::of::<i32>()], Vec::new());
        let types = [TypeId::of::<i32>()];

        index.sync(3, Some(&types));
        index.sync(1, Some(&types));
        index.sync(2, Some(&types));
        index.sync(2, Some(&types));

        assert_eq!(index.entities, vec![1, 2, 3]);
    }

    #[test]
    fn sync_removes_entities_that_stop_matching() {
        let mut index = ViewIndex::new(vec![TypeId::of::<i32>()], vec![TypeId::of::<u8>()]);

        index.sync(1, Some(&[TypeId::of::<i32>()]));
        index.sync(2, Some(&[TypeId::of::<i32>()]));
        assert_eq!(index.entities, vec![1, 2]);

        index.sync(1, Some(&[TypeId::of::<i32>(), TypeId::of::<u8>()]));
        index.sync(2, None);
        assert!(index.entities.is_empty());
    }

    #[test]
    fn view_reports_required_and_excluded_types() {
        let view = View::new(
            1,
            0,
            vec![TypeId::of::<i32>()],
            vec![TypeId::of::<u8>()],
            vec!["i32"],
        );

        assert!(view.requires::<i32>());
        assert!(!view.requires::<u8>());
        assert!(view.excludes::<u8>());
        assert_eq!(view.component_names(), &["i32"]);
    }
}
