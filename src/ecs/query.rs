use super::archetype::{Archetype, ArchetypeId};
use super::view::View;
use crate::ecs::storage::ComponentVec;
use crate::ecs::{EntityId, Storage};
use itertools::Itertools;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};

const MESSAGE_DUPLICATE_COMPONENT_TYPE: &str =
    "Component types must be different when querying more than one component type";
const MESSAGE_MISSING_COLUMN: &str = "Internal storage error. Component column not found.";

/// The `Query` trait provides methods to iterate over the entities of a [`View`] together with
/// their components. Items are yielded in the order of the view, which is entity creation order.
///
/// The mutable variants hand out direct mutable access to the components, so a system can read
/// and write in a single pass. Structural changes cannot happen while such an iterator is alive;
/// they are recorded in the world's [`CommandBuffer`](crate::ecs::CommandBuffer) instead.
///
/// # Examples
/// ```
/// use starfield_engine::ecs::{Query, World};
///
/// let mut world = World::new();
/// let entity = world.create_entity((42, 24.0f32)).unwrap();
/// world.create_entity((7,)).unwrap();
///
/// let view = world.archetype::<(i32, f32)>();
///
/// for (id, (int_component, float_component)) in world.storage.query_two_mut::<i32, f32>(&view) {
///     assert_eq!(id, entity);
///     *int_component += 1;
///     *float_component *= 2.0;
/// }
///
/// assert_eq!(world.get::<i32>(entity), Some(&43));
/// assert_eq!(world.get::<f32>(entity), Some(&48.0));
/// ```
///
/// # Panics
///
/// Panics if two component types are the same, if a component type is not required by the view,
/// or if the view was registered with a different world.
pub trait Query {
    fn query_one<ComponentType: 'static>(
        &self,
        view: &View,
    ) -> impl Iterator<Item = (EntityId, &ComponentType)>;
    fn query_one_mut<ComponentType: 'static>(
        &mut self,
        view: &View,
    ) -> impl Iterator<Item = (EntityId, &mut ComponentType)>;
    fn query_two<ComponentType1: 'static, ComponentType2: 'static>(
        &self,
        view: &View,
    ) -> impl Iterator<Item = (EntityId, (&ComponentType1, &ComponentType2))>;
    fn query_two_mut<ComponentType1: 'static, ComponentType2: 'static>(
        &mut self,
        view: &View,
    ) -> impl Iterator<Item = (EntityId, (&mut ComponentType1, &mut ComponentType2))>;
    fn query_three<ComponentType1: 'static, ComponentType2: 'static, ComponentType3: 'static>(
        &self,
        view: &View,
    ) -> impl Iterator<
        Item = (
            EntityId,
            (&ComponentType1, &ComponentType2, &ComponentType3),
        ),
    >;
    fn query_three_mut<ComponentType1: 'static, ComponentType2: 'static, ComponentType3: 'static>(
        &mut self,
        view: &View,
    ) -> impl Iterator<
        Item = (
            EntityId,
            (
                &mut ComponentType1,
                &mut ComponentType2,
                &mut ComponentType3,
            ),
        ),
    >;
    fn query_four<
        ComponentType1: 'static,
        ComponentType2: 'static,
        ComponentType3: 'static,
        ComponentType4: 'static,
    >(
        &self,
        view: &View,
    ) -> impl Iterator<
        Item = (
            EntityId,
            (
                &ComponentType1,
                &ComponentType2,
                &ComponentType3,
                &ComponentType4,
            ),
        ),
    >;
    fn query_four_mut<
        ComponentType1: 'static,
        ComponentType2: 'static,
        ComponentType3: 'static,
        ComponentType4: 'static,
    >(
        &mut self,
        view: &View,
    ) -> impl Iterator<
        Item = (
            EntityId,
            (
                &mut ComponentType1,
                &mut ComponentType2,
                &mut ComponentType3,
                &mut ComponentType4,
            ),
        ),
    >;
}

macro_rules! iterate_view {
    ($storage:ident, $view:ident, $($component:ty),+) => {{
        checked_type_ids(
            $view,
            &[$(TypeId::of::<$component>()),+],
            &[$(std::any::type_name::<$component>()),+],
        );

        let order = &$storage.view_index($view).entities;
        let Storage { archetypes, entity_index, .. } = $storage;

        order.iter().map(move |&entity| {
            let record = &entity_index[&entity];
            let archetype = &archetypes[&record.archetype_id];

            (
                entity,
                ($(component_at::<$component>(archetype, record.entity_row),)+),
            )
        })
    }};
}

macro_rules! iterate_view_mut {
    ($storage:ident, $view:ident, $($component:ty),+) => {{
        use itertools::izip;

        let type_ids = checked_type_ids(
            $view,
            &[$(TypeId::of::<$component>()),+],
            &[$(std::any::type_name::<$component>()),+],
        );

        // validates that the view belongs to this storage
        let _ = $storage.view_index($view);

        let Storage { archetypes, component_index, views, .. } = $storage;
        let order = &views[$view.id].entities;
        let mut rows = HashMap::with_capacity(order.len());

        for archetype in get_view_archetypes_mut(archetypes, component_index, $view) {
            let Archetype { entities, component_types, .. } = archetype;
            let mut columns = iter_mut_columns_by_type_ids(component_types, &type_ids);

            rows.extend(entities.iter().copied().zip(izip!(
                $(
                    columns
                        .next()
                        .expect(MESSAGE_MISSING_COLUMN)
                        .as_any_mut()
                        .downcast_mut::<Vec<$component>>()
                        .expect(MESSAGE_MISSING_COLUMN)
                        .iter_mut(),
                )+
            )));
        }

        order
            .iter()
            .filter_map(move |entity| rows.remove(entity).map(|row| (*entity, row)))
    }};
}

impl Query for Storage {
    fn query_one<ComponentType: 'static>(
        &self,
        view: &View,
    ) -> impl Iterator<Item = (EntityId, &ComponentType)> {
        iterate_view!(self, view, ComponentType).map(|(entity, (component,))| (entity, component))
    }

    fn query_one_mut<ComponentType: 'static>(
        &mut self,
        view: &View,
    ) -> impl Iterator<Item = (EntityId, &mut ComponentType)> {
        checked_type_ids(
            view,
            &[TypeId::of::<ComponentType>()],
            &[std::any::type_name::<ComponentType>()],
        );

        let _ = self.view_index(view);

        let Storage {
            archetypes,
            component_index,
            views,
            ..
        } = self;
        let order = &views[view.id].entities;
        let mut rows = HashMap::with_capacity(order.len());

        for archetype in get_view_archetypes_mut(archetypes, component_index, view) {
            let Archetype {
                entities,
                component_types,
                ..
            } = archetype;

            let column = component_types
                .iter_mut()
                .find_map(|column| column.as_any_mut().downcast_mut::<Vec<ComponentType>>())
                .expect(MESSAGE_MISSING_COLUMN);

            rows.extend(entities.iter().copied().zip(column.iter_mut()));
        }

        order
            .iter()
            .filter_map(move |entity| rows.remove(entity).map(|component| (*entity, component)))
    }

    fn query_two<ComponentType1: 'static, ComponentType2: 'static>(
        &self,
        view: &View,
    ) -> impl Iterator<Item = (EntityId, (&ComponentType1, &ComponentType2))> {
        iterate_view!(self, view, ComponentType1, ComponentType2)
    }

    fn query_two_mut<ComponentType1: 'static, ComponentType2: 'static>(
        &mut self,
        view: &View,
    ) -> impl Iterator<Item = (EntityId, (&mut ComponentType1, &mut ComponentType2))> {
        iterate_view_mut!(self, view, ComponentType1, ComponentType2)
    }

    fn query_three<ComponentType1: 'static, ComponentType2: 'static, ComponentType3: 'static>(
        &self,
        view: &View,
    ) -> impl Iterator<
        Item = (
            EntityId,
            (&ComponentType1, &ComponentType2, &ComponentType3),
        ),
    > {
        iterate_view!(self, view, ComponentType1, ComponentType2, ComponentType3)
    }

    fn query_three_mut<
        ComponentType1: 'static,
        ComponentType2: 'static,
        ComponentType3: 'static,
    >(
        &mut self,
        view: &View,
    ) -> impl Iterator<
        Item = (
            EntityId,
            (
                &mut ComponentType1,
                &mut ComponentType2,
                &mut ComponentType3,
            ),
        ),
    > {
        iterate_view_mut!(self, view, ComponentType1, ComponentType2, ComponentType3)
    }

    fn query_four<
        ComponentType1: 'static,
        ComponentType2: 'static,
        ComponentType3: 'static,
        ComponentType4: 'static,
    >(
        &self,
        view: &View,
    ) -> impl Iterator<
        Item = (
            EntityId,
            (
                &ComponentType1,
                &ComponentType2,
                &ComponentType3,
                &ComponentType4,
            ),
        ),
    > {
        iterate_view!(
            self,
            view,
            ComponentType1,
            ComponentType2,
            ComponentType3,
            ComponentType4
        )
    }

    fn query_four_mut<
        ComponentType1: 'static,
        ComponentType2: 'static,
        ComponentType3: 'static,
        ComponentType4: 'static,
    >(
        &mut self,
        view: &View,
    ) -> impl Iterator<
        Item = (
            EntityId,
            (
                &mut ComponentType1,
                &mut ComponentType2,
                &mut ComponentType3,
                &mut ComponentType4,
            ),
        ),
    > {
        iterate_view_mut!(
            self,
            view,
            ComponentType1,
            ComponentType2,
            ComponentType3,
            ComponentType4
        )
    }
}

/// Asserts that the requested component types are distinct and all required by the view.
fn checked_type_ids(view: &View, type_ids: &[TypeId], names: &[&'static str]) -> Vec<TypeId> {
    assert_eq!(
        type_ids.iter().collect::<HashSet<_>>().len(),
        type_ids.len(),
        "{MESSAGE_DUPLICATE_COMPONENT_TYPE}"
    );

    for (type_id, name) in type_ids.iter().zip(names) {
        assert!(
            view.required.contains(type_id),
            "Component type `{name}` is not required by the queried view"
        );
    }

    type_ids.to_vec()
}

fn get_archetype_ids_for_types(
    component_index: &HashMap<TypeId, Vec<ArchetypeId>>,
    type_ids: &[TypeId],
) -> HashSet<ArchetypeId> {
    let mut archetype_sets: Vec<HashSet<_>> = type_ids
        .iter()
        .map(|type_id| {
            let archetypes = component_index.get(type_id);

            archetypes.map_or_else(HashSet::new, |archetypes| {
                archetypes.iter().copied().collect::<HashSet<_>>()
            })
        })
        .collect();

    // get the smallest set
    let Some(smallest_set_pos) = archetype_sets
        .iter()
        .position_min_by_key(|set| set.len())
    else {
        return HashSet::new();
    };
    let mut smallest_set = archetype_sets.swap_remove(smallest_set_pos);

    // get the intersection of the sets
    for set in archetype_sets {
        smallest_set = smallest_set.intersection(&set).copied().collect();
    }

    smallest_set
}

fn get_view_archetypes_mut<'a>(
    archetypes: &'a mut HashMap<ArchetypeId, Archetype>,
    component_index: &HashMap<TypeId, Vec<ArchetypeId>>,
    view: &View,
) -> Vec<&'a mut Archetype> {
    let ids = get_archetype_ids_for_types(component_index, &view.required);

    archetypes
        .iter_mut()
        .filter(|(id, archetype)| {
            ids.contains(*id) && archetype.matches(&view.required, &view.excluded)
        })
        .map(|(_, archetype)| archetype)
        .collect()
}

fn component_at<ComponentType: 'static>(archetype: &Archetype, row: usize) -> &ComponentType {
    &archetype
        .get_components::<ComponentType>()
        .expect(MESSAGE_MISSING_COLUMN)[row]
}

fn iter_mut_columns_by_type_ids<'a>(
    component_types: &'a mut [Box<dyn ComponentVec>],
    type_ids: &[TypeId],
) -> impl Iterator<Item = &'a mut Box<dyn ComponentVec>> {
    component_types
        .iter_mut()
        .filter(|column| type_ids.contains(&column.element_type_id()))
        .sorted_by_key(|column| {
            type_ids
                .iter()
                .position(|&id| id == column.element_type_id())
        })
}
