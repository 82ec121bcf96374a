use crate::platform::{DrawList, FrameInput, InputState, Platform, PlatformError};
use std::collections::VecDeque;
use winit::event::ElementState;
use winit::keyboard::PhysicalKey;

/// One frame of a headless run: the elapsed time reported to the loop and the input changes
/// that happened before it. Input carries over from frame to frame until it is changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptedFrame {
    pub dt: f32,
    /// Replaces the held input before `keys` are applied.
    pub input: Option<InputState>,
    /// Keyboard events, folded into the held input in order.
    pub keys: Vec<(PhysicalKey, ElementState)>,
}

impl ScriptedFrame {
    #[must_use]
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            ..Self::default()
        }
    }

    /// Sets the held input outright.
    #[must_use]
    pub fn with_input(mut self, input: InputState) -> Self {
        self.input = Some(input);
        self
    }

    /// Adds a keyboard event, as a window would deliver it.
    #[must_use]
    pub fn with_key(mut self, key: PhysicalKey, state: ElementState) -> Self {
        self.keys.push((key, state));
        self
    }
}

/// A platform without a window. It replays scripted frames and requests close once the script
/// runs out, and it keeps the last presented draw list for inspection.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    script: VecDeque<ScriptedFrame>,
    held: InputState,
    last_frame: DrawList,
    presented: usize,
    open_count: usize,
    close_count: usize,
    fail_open: bool,
    fail_present_after: Option<usize>,
}

impl HeadlessPlatform {
    #[must_use]
    pub fn new(script: Vec<ScriptedFrame>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    /// `frames` frames of `dt` seconds each, without input.
    #[must_use]
    pub fn fixed(dt: f32, frames: usize) -> Self {
        Self::new(vec![ScriptedFrame::new(dt); frames])
    }

    /// Makes [`Platform::open`] fail.
    #[must_use]
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Makes [`Platform::present`] fail once `frames` frames have been presented.
    #[must_use]
    pub fn fail_present_after(mut self, frames: usize) -> Self {
        self.fail_present_after = Some(frames);
        self
    }

    #[must_use]
    pub fn presented(&self) -> usize {
        self.presented
    }

    #[must_use]
    pub fn last_frame(&self) -> &DrawList {
        &self.last_frame
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open_count
    }

    #[must_use]
    pub fn close_count(&self) -> usize {
        self.close_count
    }
}

impl Platform for HeadlessPlatform {
    fn open(&mut self) -> Result<(), PlatformError> {
        if self.fail_open {
            return Err(PlatformError::Open("headless platform set to fail".to_owned()));
        }

        self.open_count += 1;
        Ok(())
    }

    fn poll(&mut self) -> FrameInput {
        let Some(frame) = self.script.pop_front() else {
            return FrameInput {
                close_requested: true,
                ..FrameInput::default()
            };
        };

        if let Some(input) = frame.input {
            self.held = input;
        }
        for (key, state) in frame.keys {
            self.held.apply_key(key, state);
        }

        FrameInput {
            dt: frame.dt,
            close_requested: false,
            input: self.held,
        }
    }

    fn present(&mut self, draws: &DrawList) -> Result<(), PlatformError> {
        if self
            .fail_present_after
            .is_some_and(|limit| self.presented >= limit)
        {
            return Err(PlatformError::Present(format!(
                "headless platform set to fail after {} frames",
                self.presented
            )));
        }

        self.last_frame.clone_from(draws);
        self.presented += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.close_count += 1;
    }
}
