use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Down-state of the four directional inputs, polled once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl InputState {
    /// Folds a keyboard event into the state. Arrow keys and WASD are mapped, every other key is
    /// ignored. Returns whether the key was mapped.
    ///
    /// Platforms keep one `InputState` alive across frames and feed every key event of the
    /// window through here; [`HeadlessPlatform`](crate::platform::HeadlessPlatform) does the same
    /// with scripted events.
    pub fn apply_key(&mut self, key: PhysicalKey, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;

        let slot = match key {
            PhysicalKey::Code(KeyCode::ArrowLeft | KeyCode::KeyA) => &mut self.left,
            PhysicalKey::Code(KeyCode::ArrowRight | KeyCode::KeyD) => &mut self.right,
            PhysicalKey::Code(KeyCode::ArrowUp | KeyCode::KeyW) => &mut self.up,
            PhysicalKey::Code(KeyCode::ArrowDown | KeyCode::KeyS) => &mut self.down,
            _ => return false,
        };

        *slot = pressed;
        true
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}
