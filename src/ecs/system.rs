use crate::ecs::World;
use tracing::trace_span;

/// Per-invocation context handed to every system: the time step to integrate with and whatever
/// the caller shares with its systems for this frame, such as polled input or a draw list.
/// Systems that only touch the world stay generic over `C`.
pub struct Frame<'a, C = ()> {
    pub dt: f32,
    pub context: &'a mut C,
}

/// Base trait for a subsystem of the engine. Systems are things that operate on entities and are periodically
/// updated. Examples are a rendering system that turns entities into draw requests, a movement system that
/// integrates positions, an input system that steers the player, but also game-specific systems that spawn
/// stars, advance game state etc.
///
/// A system keeps its own constructor-time dependencies (usually the views it iterates) and borrows the world
/// only for the duration of one [`update`](System::update) call.
pub trait System<C = ()> {
    /// A short, stable name used in logs.
    fn name(&self) -> &'static str;

    fn update(&mut self, world: &mut World, frame: &mut Frame<'_, C>);
}

/// An ordered list of systems. The schedule starts with no default systems for full flexibility.
///
/// # Example
///
/// ```
/// use starfield_engine::ecs::{Frame, Schedule, System, World};
///
/// struct Spawner;
///
/// impl System for Spawner {
///     fn name(&self) -> &'static str {
///         "spawner"
///     }
///
///     fn update(&mut self, world: &mut World, _frame: &mut Frame<'_>) {
///         world.commands.create_entity((1u8,));
///     }
/// }
///
/// let mut world = World::new();
/// let mut schedule = Schedule::new();
/// schedule.add_system(Spawner);
///
/// let mut frame = Frame { dt: 1.0 / 60.0, context: &mut () };
/// schedule.run(&mut world, &mut frame);
///
/// // deferred commands are applied once the system is done
/// assert_eq!(world.entity_count(), 1);
/// ```
pub struct Schedule<C = ()> {
    systems: Vec<Box<dyn System<C>>>,
}

impl<C> Default for Schedule<C> {
    fn default() -> Self {
        Self {
            systems: Vec::new(),
        }
    }
}

impl<C> Schedule<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new system. Systems run in the order they were added.
    pub fn add_system<S: System<C> + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.iter().map(|system| system.name())
    }

    /// Runs every system once, in registration order. Commands deferred by a system are applied
    /// before the next system runs, so each system sees the structural changes of the ones
    /// before it.
    pub fn run(&mut self, world: &mut World, frame: &mut Frame<'_, C>) {
        for system in &mut self.systems {
            let _span = trace_span!("system", name = system.name()).entered();

            system.update(world, frame);
            world.flush();
        }
    }
}
