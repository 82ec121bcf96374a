//! The boundary between the simulation core and whatever presents it.
//!
//! A [`Platform`] supplies frame time, input and the close request, and accepts the draw list of
//! every frame. Window creation, graphics and audio live behind this trait and are not part of
//! the core. [`HeadlessPlatform`] replays a scripted sequence of frames and records what was
//! presented, which is how the loop is tested and how the demo binary runs.
//!
//! Keyboard events arrive as winit key codes and are folded into the held [`InputState`] with
//! [`InputState::apply_key`].
mod headless;
mod input;
mod render;

pub use headless::{HeadlessPlatform, ScriptedFrame};
pub use input::InputState;
pub use render::{DrawList, DrawRequest};

use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("failed to open platform: {0}")]
    Open(String),

    #[error("failed to present frame: {0}")]
    Present(String),
}

/// What the platform reports at the start of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Elapsed seconds since the previous frame.
    pub dt: f32,
    pub close_requested: bool,
    pub input: InputState,
}

pub trait Platform {
    /// Acquires presentation resources. Called once before the first frame.
    ///
    /// # Errors
    ///
    /// Fails if the resources can not be acquired; the loop does not start in that case.
    fn open(&mut self) -> Result<(), PlatformError>;

    /// Polls frame time, input and the close request.
    fn poll(&mut self) -> FrameInput;

    /// Presents a finished frame.
    ///
    /// # Errors
    ///
    /// Fails if the frame could not be presented.
    fn present(&mut self, draws: &DrawList) -> Result<(), PlatformError>;

    /// Releases what [`open`](Platform::open) acquired.
    fn close(&mut self);
}

/// An opened platform. Closing happens exactly once, when the session is dropped, no matter how
/// the scope holding it is left.
pub struct Session<'a, P: Platform + ?Sized> {
    platform: &'a mut P,
}

impl<'a, P: Platform + ?Sized> Session<'a, P> {
    /// Opens the platform.
    ///
    /// # Errors
    ///
    /// Propagates the open error. Nothing needs to be closed then.
    pub fn open(platform: &'a mut P) -> Result<Self, PlatformError> {
        if let Err(err) = platform.open() {
            error!(%err, "platform failed to open");
            return Err(err);
        }
        debug!("platform opened");

        Ok(Self { platform })
    }

    pub fn platform(&mut self) -> &mut P {
        &mut *self.platform
    }
}

impl<P: Platform + ?Sized> Drop for Session<'_, P> {
    fn drop(&mut self) {
        self.platform.close();
        debug!("platform closed");
    }
}
