//! Decorative backdrop for the message cycle: twinkling sparkles and
//! slowly rising, spinning symbols.

use super::{Effect, Frame};
use crate::color::{self, Rgb, SPARKLE_COLORS};
use crate::surface::{Surface, TextStyle};

const SPARKLE_COUNT: usize = 120;
const SYMBOL_COUNT: usize = 15;
// Symbols travel this far past an edge before wrapping
const SYMBOL_MARGIN: f32 = 50.0;

const SYMBOLS: [char; 7] = ['✦', '✧', '★', '☆', '♥', '❀', '✿'];
const SYMBOL_FONT: &str = "Arial";

#[derive(Clone, Debug, PartialEq)]
pub struct Sparkle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub vx: f32,
    pub vy: f32,
    pub alpha: f32,
    pub twinkle_speed: f32,
    pub color: Rgb,
}

impl Sparkle {
    pub fn scatter(width: f32, height: f32) -> Self {
        Self {
            x: fastrand::f32() * width,
            y: fastrand::f32() * height,
            size: 1.0 + fastrand::f32() * 3.0,
            vx: (fastrand::f32() - 0.5) * 2.0,
            vy: (fastrand::f32() - 0.5) * 2.0,
            alpha: fastrand::f32(),
            twinkle_speed: 0.02 + fastrand::f32() * 0.05,
            color: color::pick(&SPARKLE_COLORS),
        }
    }
}

impl Effect for Sparkle {
    fn update(&mut self, frame: &Frame) {
        self.x += self.vx;
        self.y += self.vy;

        let phase = (frame.now as f64 * self.twinkle_speed as f64).sin() as f32;
        self.alpha = (self.alpha + phase * 0.03).clamp(0.2, 1.0);

        if self.x < 0.0 {
            self.x = frame.width;
        } else if self.x > frame.width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = frame.height;
        } else if self.y > frame.height {
            self.y = 0.0;
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_circle(self.x, self.y, self.size, self.color, self.alpha * 0.8);
        surface.fill_circle(self.x, self.y, self.size * 2.5, self.color, self.alpha * 0.2);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatingSymbol {
    pub x: f32,
    pub y: f32,
    pub glyph: char,
    pub size: f32,
    pub vx: f32,
    pub vy: f32,
    pub alpha: f32,
    /// Degrees.
    pub rotation: f32,
}

impl FloatingSymbol {
    pub fn scatter(width: f32, height: f32) -> Self {
        Self {
            x: fastrand::f32() * width,
            y: fastrand::f32() * height,
            glyph: SYMBOLS[fastrand::usize(0..SYMBOLS.len())],
            size: 15.0 + fastrand::f32() * 20.0,
            vx: fastrand::f32() - 0.5,
            vy: -0.5 - fastrand::f32(),
            alpha: 0.3 + fastrand::f32() * 0.5,
            rotation: fastrand::f32() * 360.0,
        }
    }
}

impl Effect for FloatingSymbol {
    fn update(&mut self, frame: &Frame) {
        self.x += self.vx;
        self.y += self.vy;
        self.rotation = (self.rotation + 1.0) % 360.0;

        if self.y < -SYMBOL_MARGIN {
            self.y = frame.height + SYMBOL_MARGIN;
            self.x = fastrand::f32() * frame.width;
        }
        if self.x < -SYMBOL_MARGIN {
            self.x = frame.width + SYMBOL_MARGIN;
        } else if self.x > frame.width + SYMBOL_MARGIN {
            self.x = -SYMBOL_MARGIN;
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let mut buf = [0u8; 4];
        let glyph = self.glyph.encode_utf8(&mut buf);
        let style = TextStyle {
            alpha: self.alpha,
            ..TextStyle::centered(self.size, SYMBOL_FONT, Rgb::WHITE)
        };

        surface.push_transform(self.x, self.y, self.rotation.to_radians());
        surface.fill_text(glyph, 0.0, 0.0, &style);
        surface.pop_transform();
    }
}

/// Sparkles and floating symbols, reset each time the message cycle starts.
#[derive(Debug, Default)]
pub struct AmbientLayer {
    sparkles: Vec<Sparkle>,
    symbols: Vec<FloatingSymbol>,
}

impl AmbientLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both collections with freshly randomized ones.
    pub fn scatter(&mut self, width: f32, height: f32) {
        self.sparkles = (0..SPARKLE_COUNT).map(|_| Sparkle::scatter(width, height)).collect();
        self.symbols = (0..SYMBOL_COUNT)
            .map(|_| FloatingSymbol::scatter(width, height))
            .collect();
    }

    pub fn clear(&mut self) {
        self.sparkles.clear();
        self.symbols.clear();
    }

    pub fn sparkles(&self) -> &[Sparkle] {
        &self.sparkles
    }

    pub fn symbols(&self) -> &[FloatingSymbol] {
        &self.symbols
    }
}

impl Effect for AmbientLayer {
    fn update(&mut self, frame: &Frame) {
        for sparkle in &mut self.sparkles {
            sparkle.update(frame);
        }
        for symbol in &mut self.symbols {
            symbol.update(frame);
        }
    }

    /// Sparkles first, symbols on top.
    fn draw(&self, surface: &mut dyn Surface) {
        for sparkle in &self.sparkles {
            sparkle.draw(surface);
        }
        for symbol in &self.symbols {
            symbol.draw(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, Recorder};

    fn frame() -> Frame {
        Frame { now: 0, width: 200.0, height: 100.0 }
    }

    #[test]
    fn test_scatter_counts() {
        let mut layer = AmbientLayer::new();
        layer.scatter(200.0, 100.0);
        assert_eq!(layer.sparkles().len(), SPARKLE_COUNT);
        assert_eq!(layer.symbols().len(), SYMBOL_COUNT);
        assert!(layer.sparkles().iter().all(|s| s.x <= 200.0 && s.y <= 100.0));

        layer.clear();
        assert!(layer.sparkles().is_empty() && layer.symbols().is_empty());
    }

    #[test]
    fn test_sparkle_wraps_and_clamps() {
        let mut s = Sparkle::scatter(200.0, 100.0);
        s.x = 0.5;
        s.y = 99.5;
        s.vx = -1.0;
        s.vy = 1.0;
        s.alpha = 0.05;
        s.update(&frame());
        assert_eq!((s.x, s.y), (200.0, 0.0));
        // now = 0 means no twinkle this frame, only the clamp
        assert_eq!(s.alpha, 0.2);
    }

    #[test]
    fn test_symbol_respawns_below_and_wraps_sideways() {
        let mut sym = FloatingSymbol::scatter(200.0, 100.0);
        sym.x = 120.0;
        sym.y = -49.5;
        sym.vx = 0.0;
        sym.vy = -1.0;
        sym.update(&frame());
        assert_eq!(sym.y, 150.0);
        assert!(sym.x >= 0.0 && sym.x <= 200.0);

        sym.x = 250.5;
        sym.vx = 0.5;
        sym.update(&frame());
        assert_eq!(sym.x, -50.0);
    }

    #[test]
    fn test_symbol_draw_is_scoped() {
        let mut rec = Recorder::new(200.0, 100.0);
        let mut sym = FloatingSymbol::scatter(200.0, 100.0);
        sym.glyph = '♥';
        sym.rotation = 90.0;
        sym.draw(&mut rec);

        assert_eq!(rec.depth(), 0);
        assert!(matches!(rec.ops()[0], DrawOp::PushTransform { radians, .. } if (radians - std::f32::consts::FRAC_PI_2).abs() < 1e-6));
        assert_eq!(rec.texts().collect::<Vec<_>>(), vec!["♥"]);
        assert_eq!(rec.ops()[2], DrawOp::PopTransform);
    }
}
