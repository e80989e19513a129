use crate::surface::Surface;

pub mod ambient;
pub mod firework;
pub mod particle;

/// Per-frame context handed to every effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Clock time in milliseconds.
    pub now: u64,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn new(now: u64, surface: &dyn Surface) -> Self {
        Self {
            now,
            width: surface.width(),
            height: surface.height(),
        }
    }
}

/// A simulated entity advanced once per frame.
pub trait Effect {
    fn update(&mut self, frame: &Frame);
    fn draw(&self, surface: &mut dyn Surface);
    /// False once the effect can be dropped by its owner.
    fn is_alive(&self) -> bool {
        true
    }
}
