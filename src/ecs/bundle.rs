use crate::ecs::archetype::Archetype;
use crate::ecs::storage::ComponentVec;
use crate::ecs::EcsError;
use std::any::{type_name, TypeId};

/// A static list of component types. Implemented for tuples of up to six `'static` types and used
/// to describe which components a [`View`](crate::ecs::View) requires or excludes.
pub trait ComponentSet: 'static {
    /// The type ids of the set, in declaration order.
    fn type_ids() -> Vec<TypeId>;

    /// Human readable component names, in declaration order.
    fn type_names() -> Vec<&'static str>;
}

/// A bag of component values that can be attached to a new entity in one step.
///
/// Usage:
/// ```
/// use starfield_engine::ecs::{EcsError, World};
///
/// struct Name(&'static str);
/// struct Health(i32);
///
/// let mut world = World::new();
/// let player = world.create_entity((Name("Player"), Health(100))).unwrap();
/// assert!(world.has_component::<Health>(player));
///
/// // a bag naming the same component type twice is malformed
/// let result = world.create_entity((Health(1), Health(2)));
/// assert!(matches!(result, Err(EcsError::DuplicateComponent(_))));
/// assert_eq!(world.entity_count(), 1);
/// ```
pub trait Bundle: ComponentSet {
    #[doc(hidden)]
    fn empty_columns() -> Vec<Box<dyn ComponentVec>>;

    #[doc(hidden)]
    fn push_into(self, archetype: &mut Archetype);

    /// Checks that no component type appears twice in the bundle.
    fn validate() -> Result<(), EcsError> {
        let type_ids = Self::type_ids();

        for (index, type_id) in type_ids.iter().enumerate() {
            if type_ids[..index].contains(type_id) {
                return Err(EcsError::DuplicateComponent(Self::type_names()[index]));
            }
        }

        Ok(())
    }
}

macro_rules! impl_component_tuple {
    ($($component:ident),*) => {
        impl<$($component: 'static),*> ComponentSet for ($($component,)*) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$component>()),*]
            }

            fn type_names() -> Vec<&'static str> {
                vec![$(type_name::<$component>()),*]
            }
        }

        impl<$($component: 'static),*> Bundle for ($($component,)*) {
            fn empty_columns() -> Vec<Box<dyn ComponentVec>> {
                vec![$(Box::<Vec<$component>>::default() as Box<dyn ComponentVec>),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn push_into(self, archetype: &mut Archetype) {
                let ($($component,)*) = self;
                $(archetype.push_component($component);)*
            }
        }
    };
}

impl_component_tuple!();
impl_component_tuple!(A);
impl_component_tuple!(A, B);
impl_component_tuple!(A, B, C);
impl_component_tuple!(A, B, C, D);
impl_component_tuple!(A, B, C, D, E);
impl_component_tuple!(A, B, C, D, E, F);
