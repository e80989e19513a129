//! Drawing surface abstraction.
//!
//! Everything the show paints goes through [`Surface`]: translucent
//! full-surface overlays, filled circles, styled text and a translate+rotate
//! transform stack. [`Recorder`] is a headless implementation that keeps the
//! issued operations for inspection.

use crate::color::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Baseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Blurred glow drawn behind text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgb,
    pub blur: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle<'a> {
    pub size: f32,
    pub family: &'a str,
    pub bold: bool,
    pub align: TextAlign,
    pub baseline: Baseline,
    pub color: Rgb,
    pub alpha: f32,
    pub shadow: Option<Shadow>,
}

impl<'a> TextStyle<'a> {
    /// Centered, middle-baseline text at full opacity.
    pub fn centered(size: f32, family: &'a str, color: Rgb) -> Self {
        Self {
            size,
            family,
            bold: false,
            align: TextAlign::Center,
            baseline: Baseline::Middle,
            color,
            alpha: 1.0,
            shadow: None,
        }
    }
}

pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Blends `color` at `alpha` over the rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32);

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32);

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle<'_>);

    /// Translates by (`dx`, `dy`) then rotates by `radians` until the matching
    /// [`Surface::pop_transform`].
    fn push_transform(&mut self, dx: f32, dy: f32, radians: f32);

    fn pop_transform(&mut self);

    /// Opaque fill of the whole surface.
    fn clear(&mut self, color: Rgb) {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0.0, 0.0, w, h, color, 1.0);
    }

    /// Translucent fill of the whole surface; repeated every frame this
    /// leaves fading trails behind moving entities.
    fn fade(&mut self, color: Rgb, alpha: f32) {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0.0, 0.0, w, h, color, alpha);
    }
}

/// A drawing operation captured by [`Recorder`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Rect { x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32 },
    Circle { x: f32, y: f32, radius: f32, color: Rgb, alpha: f32 },
    Text { text: String, x: f32, y: f32, size: f32, color: Rgb, alpha: f32 },
    PushTransform { dx: f32, dy: f32, radians: f32 },
    PopTransform,
}

/// Headless surface that records every operation.
#[derive(Debug)]
pub struct Recorder {
    width: f32,
    height: f32,
    ops: Vec<DrawOp>,
    depth: usize,
}

impl Recorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            depth: 0,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Takes the recorded operations, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Current transform nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for Recorder {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        self.ops.push(DrawOp::Rect { x, y, w, h, color, alpha });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32) {
        self.ops.push(DrawOp::Circle { x, y, radius, color, alpha });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle<'_>) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            size: style.size,
            color: style.color,
            alpha: style.alpha,
        });
    }

    fn push_transform(&mut self, dx: f32, dy: f32, radians: f32) {
        self.depth += 1;
        self.ops.push(DrawOp::PushTransform { dx, dy, radians });
    }

    fn pop_transform(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.ops.push(DrawOp::PopTransform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_covers_whole_surface() {
        let mut rec = Recorder::new(640.0, 480.0);
        rec.fade(Rgb::BLACK, 0.2);
        assert_eq!(
            rec.ops(),
            &[DrawOp::Rect { x: 0.0, y: 0.0, w: 640.0, h: 480.0, color: Rgb::BLACK, alpha: 0.2 }]
        );
    }

    #[test]
    fn test_transform_depth_tracking() {
        let mut rec = Recorder::new(10.0, 10.0);
        rec.push_transform(1.0, 2.0, 0.5);
        rec.push_transform(0.0, 0.0, 0.0);
        assert_eq!(rec.depth(), 2);
        rec.pop_transform();
        rec.pop_transform();
        rec.pop_transform();
        assert_eq!(rec.depth(), 0);
    }
}
