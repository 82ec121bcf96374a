use crate::color::Rgba;
use glam::Vec2;

/// One sprite-sized draw call in pixel space. Rotation is in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRequest {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub color: Rgba,
}

/// The draw requests of one frame, in submission order. Later requests draw on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    requests: Vec<DrawRequest>,
}

impl DrawList {
    pub fn push(&mut self, request: DrawRequest) {
        self.requests.push(request);
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawRequest> {
        self.requests.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[DrawRequest] {
        &self.requests
    }
}
