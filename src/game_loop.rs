//! The frame loop.
//!
//! Every frame:
//!
//! 1. Poll frame time, input and the close request from the platform.
//! 2. Add the frame time to the fixed-step accumulator.
//! 3. Run the fixed schedule once per whole fixed step in the accumulator.
//! 4. Run the frame schedule once with the variable frame time.
//! 5. Present the draw list.
//!
//! Steps 2 to 4 are [`GameLoop::frame`], which needs no platform and is what tests drive.
use crate::ecs::{Frame, Schedule, World};
use crate::platform::{DrawList, FrameInput, InputState, Platform, PlatformError, Session};
use tracing::{info, trace, warn};

/// What the loop shares with its systems every frame: the input polled at the start of the
/// frame and the draw list that is presented at its end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameContext {
    pub input: InputState,
    pub draws: DrawList,
}

/// Timing configuration of the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Seconds per fixed step.
    pub fixed_step: f32,
    /// Fixed steps run at most per frame. Whole steps beyond this are dropped.
    pub max_fixed_steps_per_frame: u32,
    /// Stop after this many frames even if no close was requested.
    pub max_frames: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            max_fixed_steps_per_frame: 8,
            max_frames: None,
        }
    }
}

/// Timing state carried from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopState {
    /// Number of frames run so far.
    pub frame: u64,
    /// Seconds not yet consumed by fixed steps. Always below one fixed step after a frame.
    pub accumulator: f32,
    /// Frame time of the last frame.
    pub variable_dt: f32,
    /// Fixed steps run in the last frame.
    pub fixed_steps: u32,
}

/// Owns the world and the schedules and drives them frame by frame.
pub struct GameLoop {
    config: LoopConfig,
    state: LoopState,
    world: World,
    fixed: Schedule<FrameContext>,
    systems: Schedule<FrameContext>,
    context: FrameContext,
}

impl GameLoop {
    /// `systems` run once per frame with the variable frame time.
    #[must_use]
    pub fn new(world: World, systems: Schedule<FrameContext>, config: LoopConfig) -> Self {
        Self {
            config,
            state: LoopState::default(),
            world,
            fixed: Schedule::new(),
            systems,
            context: FrameContext::default(),
        }
    }

    /// Systems that run once per fixed step with `dt = fixed_step`. Empty by default.
    #[must_use]
    pub fn with_fixed_schedule(mut self, fixed: Schedule<FrameContext>) -> Self {
        self.fixed = fixed;
        self
    }

    #[must_use]
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The draw list of the last frame.
    #[must_use]
    pub fn draws(&self) -> &DrawList {
        &self.context.draws
    }

    /// Advances the simulation by one frame. Negative or non-finite frame times count as zero.
    pub fn frame(&mut self, input: &FrameInput) -> &LoopState {
        let dt = if input.dt.is_finite() && input.dt > 0.0 {
            input.dt
        } else {
            0.0
        };
        let fixed_step = self.config.fixed_step;

        self.state.frame += 1;
        self.state.variable_dt = dt;
        self.state.accumulator += dt;
        self.context.input = input.input;
        self.context.draws.clear();

        let mut steps = 0;
        while self.state.accumulator >= fixed_step {
            if steps == self.config.max_fixed_steps_per_frame {
                let dropped = (self.state.accumulator / fixed_step).floor();
                self.state.accumulator %= fixed_step;
                warn!(
                    frame = self.state.frame,
                    dropped_steps = dropped,
                    max_steps = self.config.max_fixed_steps_per_frame,
                    "fixed step budget exceeded, dropping steps"
                );
                break;
            }

            let mut frame = Frame {
                dt: fixed_step,
                context: &mut self.context,
            };
            self.fixed.run(&mut self.world, &mut frame);

            self.state.accumulator -= fixed_step;
            steps += 1;
        }
        self.state.fixed_steps = steps;

        let mut frame = Frame {
            dt,
            context: &mut self.context,
        };
        self.systems.run(&mut self.world, &mut frame);

        trace!(
            frame = self.state.frame,
            dt,
            fixed_steps = steps,
            draws = self.context.draws.len(),
            "frame done"
        );

        &self.state
    }

    /// Runs frames until the platform requests close or `max_frames` is reached, presenting
    /// each one. The platform is opened before the first frame and closed exactly once
    /// afterwards, also when presenting fails. Returns the number of frames run.
    ///
    /// # Errors
    ///
    /// Fails if the platform can not be opened or a frame can not be presented.
    pub fn run<P: Platform + ?Sized>(&mut self, platform: &mut P) -> Result<u64, PlatformError> {
        info!(
            fixed_step = self.config.fixed_step,
            max_frames = ?self.config.max_frames,
            systems = ?self.systems.names().collect::<Vec<_>>(),
            "starting game loop"
        );

        let mut session = Session::open(platform)?;
        let mut frames = 0;

        loop {
            let input = session.platform().poll();
            if input.close_requested {
                info!(frames, "close requested");
                break;
            }

            self.frame(&input);
            session.platform().present(&self.context.draws)?;
            frames += 1;

            if self.config.max_frames.is_some_and(|max| frames >= max) {
                info!(frames, "frame limit reached");
                break;
            }
        }

        info!(frames, entities = self.world.entity_count(), "game loop stopped");
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Transform, Velocity};
    use crate::ecs::System;
    use crate::platform::{HeadlessPlatform, InputState, ScriptedFrame};
    use crate::systems::MovementSystem;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct DtRecorder(Rc<RefCell<Vec<f32>>>);

    impl System<FrameContext> for DtRecorder {
        fn name(&self) -> &'static str {
            "dt_recorder"
        }

        fn update(&mut self, _world: &mut World, frame: &mut Frame<'_, FrameContext>) {
            self.0.borrow_mut().push(frame.dt);
        }
    }

    fn recorder() -> (Schedule<FrameContext>, Rc<RefCell<Vec<f32>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut schedule = Schedule::new();
        schedule.add_system(DtRecorder(Rc::clone(&log)));
        (schedule, log)
    }

    fn quarter_step_config(max_fixed_steps_per_frame: u32) -> LoopConfig {
        LoopConfig {
            fixed_step: 0.25,
            max_fixed_steps_per_frame,
            max_frames: None,
        }
    }

    fn input(dt: f32) -> FrameInput {
        FrameInput {
            dt,
            ..FrameInput::default()
        }
    }

    #[test]
    fn accumulator_runs_whole_fixed_steps_and_keeps_the_remainder() {
        let (fixed, fixed_log) = recorder();
        let (systems, frame_log) = recorder();
        let mut game =
            GameLoop::new(World::new(), systems, quarter_step_config(8)).with_fixed_schedule(fixed);

        let state = *game.frame(&input(0.625));
        assert_eq!(state.fixed_steps, 2);
        assert_eq!(state.accumulator, 0.125);

        let state = *game.frame(&input(0.125));
        assert_eq!(state.fixed_steps, 1);
        assert_eq!(state.accumulator, 0.0);
        assert_eq!(state.frame, 2);

        assert_eq!(*fixed_log.borrow(), vec![0.25, 0.25, 0.25]);
        assert_eq!(*frame_log.borrow(), vec![0.625, 0.125]);
    }

    #[test]
    fn excess_fixed_steps_are_dropped() {
        let (fixed, fixed_log) = recorder();
        let mut game = GameLoop::new(World::new(), Schedule::new(), quarter_step_config(2))
            .with_fixed_schedule(fixed);

        let state = *game.frame(&input(1.125));

        assert_eq!(state.fixed_steps, 2);
        assert_eq!(state.accumulator, 0.125);
        assert_eq!(fixed_log.borrow().len(), 2);
    }

    #[test]
    fn invalid_frame_times_count_as_zero() {
        let (systems, frame_log) = recorder();
        let mut game = GameLoop::new(World::new(), systems, LoopConfig::default());

        game.frame(&input(-1.0));
        game.frame(&input(f32::NAN));

        assert_eq!(*frame_log.borrow(), vec![0.0, 0.0]);
        assert_eq!(game.state().accumulator, 0.0);
    }

    #[test]
    fn movement_uses_the_variable_frame_time() {
        let mut world = World::new();
        let mut systems = Schedule::new();
        systems.add_system(MovementSystem::new(&mut world));
        let entity = world
            .create_entity((Transform::default(), Velocity(Vec2::new(10.0, 0.0))))
            .unwrap();

        let mut game = GameLoop::new(world, systems, LoopConfig::default());
        game.frame(&input(0.5));

        assert_eq!(
            game.world().get::<Transform>(entity).unwrap().position.x,
            5.0
        );
    }

    #[test]
    fn run_stops_on_close_request_and_closes_once() {
        let (systems, frame_log) = recorder();
        let mut game = GameLoop::new(World::new(), systems, LoopConfig::default());
        let held = InputState {
            right: true,
            ..InputState::default()
        };
        let mut platform = HeadlessPlatform::new(vec![
            ScriptedFrame::new(0.1),
            ScriptedFrame::new(0.2).with_input(held),
        ]);

        let frames = game.run(&mut platform).unwrap();

        assert_eq!(frames, 2);
        assert_eq!(platform.presented(), 2);
        assert_eq!(platform.open_count(), 1);
        assert_eq!(platform.close_count(), 1);
        assert_eq!(*frame_log.borrow(), vec![0.1, 0.2]);
    }

    #[test]
    fn run_honours_the_frame_limit() {
        let config = LoopConfig {
            max_frames: Some(3),
            ..LoopConfig::default()
        };
        let mut game = GameLoop::new(World::new(), Schedule::new(), config);
        let mut platform = HeadlessPlatform::fixed(1.0 / 60.0, 10);

        assert_eq!(game.run(&mut platform), Ok(3));
        assert_eq!(game.state().frame, 3);
        assert_eq!(platform.close_count(), 1);
    }

    #[test]
    fn run_closes_the_platform_when_presenting_fails() {
        let mut game = GameLoop::new(World::new(), Schedule::new(), LoopConfig::default());
        let mut platform = HeadlessPlatform::fixed(1.0 / 60.0, 10).fail_present_after(4);

        assert!(matches!(
            game.run(&mut platform),
            Err(PlatformError::Present(_))
        ));
        assert_eq!(game.state().frame, 5);
        assert_eq!(platform.close_count(), 1);
    }

    #[test]
    fn run_does_not_start_when_open_fails() {
        let mut game = GameLoop::new(World::new(), Schedule::new(), LoopConfig::default());
        let mut platform = HeadlessPlatform::fixed(1.0 / 60.0, 10).fail_open();

        assert!(matches!(
            game.run(&mut platform),
            Err(PlatformError::Open(_))
        ));
        assert_eq!(game.state().frame, 0);
        assert_eq!(platform.close_count(), 0);
    }
}
