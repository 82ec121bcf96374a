use crate::ecs::EntityId;

/// Errors returned by structural operations on the [`World`](crate::ecs::World).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity was never created or has already been destroyed.
    #[error("entity {0} does not exist")]
    EntityNotFound(EntityId),

    /// The entity exists but does not hold the requested component.
    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },

    /// A component bag named the same component type more than once.
    #[error("component `{0}` appears more than once in the same bundle")]
    DuplicateComponent(&'static str),
}
