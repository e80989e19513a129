//! Terminal implementation of [`Surface`].
//!
//! Each terminal cell shows two stacked pixels through the lower half block
//! `▄` (background = top pixel, foreground = bottom pixel). One pixel covers
//! 8×8 surface units, so a 200×50 terminal is an 1600×800 surface.
//!
//! Pixels persist between frames, which is what lets a translucent
//! full-surface fill leave trails. Text lands on a per-frame cell overlay
//! that is discarded after [`TerminalSurface::present`].

use crate::color::Rgb;
use crate::surface::{Baseline, Surface, TextAlign, TextStyle};
use std::io::{self, Write};

const UNITS_PER_PIXEL: f32 = 8.0;
const UNITS_PER_CELL_Y: f32 = UNITS_PER_PIXEL * 2.0;
// Shadow tint strength under text at full blur
const SHADOW_TINT: f32 = 0.25;
const FULL_BLUR: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Glyph {
    ch: char,
    color: Rgb,
    alpha: f32,
}

#[derive(Clone, Copy, Debug)]
struct Transform {
    dx: f32,
    dy: f32,
    cos: f32,
    sin: f32,
}

pub struct TerminalSurface {
    cols: usize,
    rows: usize,
    bg: Rgb,
    pixels: Vec<[f32; 3]>,
    glyphs: Vec<Option<Glyph>>,
    transforms: Vec<Transform>,
    output_buf: Vec<u8>,
}

impl TerminalSurface {
    pub fn new(cols: usize, rows: usize, bg: Rgb) -> Self {
        Self {
            cols,
            rows,
            bg,
            pixels: vec![[0.0; 3]; cols * rows * 2],
            glyphs: vec![None; cols * rows],
            transforms: Vec::new(),
            output_buf: Vec::with_capacity(cols * rows * 25),
        }
    }

    /// Reallocates for a new terminal size. The picture is dropped; whatever
    /// is being simulated keeps its coordinates.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        self.pixels = vec![[0.0; 3]; cols * rows * 2];
        self.glyphs = vec![None; cols * rows];
        self.output_buf = Vec::with_capacity(cols * rows * 25);
    }

    fn pixel_height(&self) -> usize {
        self.rows * 2
    }

    /// Maps a point through the transform stack into surface units.
    fn project(&self, x: f32, y: f32) -> (f32, f32) {
        self.transforms.iter().rev().fold((x, y), |(x, y), t| {
            (t.dx + t.cos * x - t.sin * y, t.dy + t.sin * x + t.cos * y)
        })
    }

    fn blend(&mut self, px: usize, py: usize, color: Rgb, alpha: f32) {
        let idx = py * self.cols + px;
        let pixel = &mut self.pixels[idx];
        let c = [color.0 as f32, color.1 as f32, color.2 as f32];
        for (channel, target) in pixel.iter_mut().zip(c) {
            *channel = *channel * (1.0 - alpha) + target * alpha;
        }
    }

    /// Final color of a pixel: the canvas is light added over the background.
    fn shade(&self, idx: usize) -> Rgb {
        let p = self.pixels[idx];
        let add = |bg: u8, v: f32| (bg as f32 + v).round().clamp(0.0, 255.0) as u8;
        Rgb(add(self.bg.0, p[0]), add(self.bg.1, p[1]), add(self.bg.2, p[2]))
    }

    fn cell_rgb(&self, col: usize, row: usize) -> (Rgb, Rgb) {
        let top = self.shade(row * 2 * self.cols + col);
        let bottom = self.shade((row * 2 + 1) * self.cols + col);
        (top, bottom)
    }

    /// Writes the frame and discards the text overlay.
    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let mut buf = std::mem::take(&mut self.output_buf);
        buf.clear();
        buf.extend_from_slice(b"\x1b[H");

        let mut prev_bg: Option<Rgb> = None;
        let mut prev_fg: Option<Rgb> = None;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let (top, bottom) = self.cell_rgb(col, row);

                let (bg, fg, ch) = match self.glyphs[row * self.cols + col] {
                    Some(glyph) => {
                        let under = top.lerp(bottom, 0.5);
                        (under, under.lerp(glyph.color, glyph.alpha), glyph.ch)
                    }
                    None => (top, bottom, '▄'),
                };

                if prev_bg != Some(bg) {
                    write!(buf, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
                    prev_bg = Some(bg);
                }
                if prev_fg != Some(fg) {
                    write!(buf, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
                    prev_fg = Some(fg);
                }

                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            buf.extend_from_slice(b"\x1b[0m");
            prev_bg = None;
            prev_fg = None;
            if row + 1 < self.rows {
                buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&buf)?;
        out.flush()?;

        self.output_buf = buf;
        self.glyphs.fill(None);
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn width(&self) -> f32 {
        self.cols as f32 * UNITS_PER_PIXEL
    }

    fn height(&self) -> f32 {
        self.rows as f32 * UNITS_PER_CELL_Y
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let (x, y) = self.project(x, y);
        let to_px = |v: f32, max: usize| (v.max(0.0) as usize).min(max);

        let x0 = to_px((x / UNITS_PER_PIXEL).floor(), self.cols);
        let x1 = to_px(((x + w) / UNITS_PER_PIXEL).ceil(), self.cols);
        let y0 = to_px((y / UNITS_PER_PIXEL).floor(), self.pixel_height());
        let y1 = to_px(((y + h) / UNITS_PER_PIXEL).ceil(), self.pixel_height());

        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, alpha);
            }
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let (x, y) = self.project(x, y);
        let cx = x / UNITS_PER_PIXEL;
        let cy = y / UNITS_PER_PIXEL;
        let r = radius / UNITS_PER_PIXEL;
        let (w, h) = (self.cols as f32, self.pixel_height() as f32);

        // Smaller than a pixel: light the pixel it falls in
        if r < 0.5 {
            if cx >= 0.0 && cx < w && cy >= 0.0 && cy < h {
                self.blend(cx as usize, cy as usize, color, alpha);
            }
            return;
        }

        let x0 = (cx - r).floor().max(0.0) as usize;
        let x1 = ((cx + r).ceil().max(0.0) as usize).min(self.cols);
        let y0 = (cy - r).floor().max(0.0) as usize;
        let y1 = ((cy + r).ceil().max(0.0) as usize).min(self.pixel_height());

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle<'_>) {
        let alpha = style.alpha.clamp(0.0, 1.0);
        let (x, y) = self.project(x, y);

        let center_y = match style.baseline {
            Baseline::Top => y + style.size / 2.0,
            Baseline::Middle => y,
            Baseline::Bottom => y - style.size / 2.0,
        };
        if center_y < 0.0 {
            return;
        }
        let row = (center_y / UNITS_PER_CELL_Y) as usize;
        if row >= self.rows {
            return;
        }

        let len = text.chars().count() as isize;
        let col = (x / UNITS_PER_PIXEL).floor() as isize;
        let start = match style.align {
            TextAlign::Left => col,
            TextAlign::Center => col - len / 2,
            TextAlign::Right => col - len,
        };

        let tint = style
            .shadow
            .filter(|s| s.blur > 0.0)
            .map(|s| (s.color, alpha * (s.blur / FULL_BLUR).min(1.0) * SHADOW_TINT));

        for (i, ch) in text.chars().enumerate() {
            let c = start + i as isize;
            if c < 0 || c >= self.cols as isize {
                continue;
            }
            let c = c as usize;

            if let Some((color, strength)) = tint {
                self.blend(c, row * 2, color, strength);
                self.blend(c, row * 2 + 1, color, strength);
            }

            // The most opaque pass over a cell wins
            let slot = &mut self.glyphs[row * self.cols + c];
            if slot.is_none_or(|g| g.alpha <= alpha) {
                *slot = Some(Glyph { ch, color: style.color, alpha });
            }
        }
    }

    fn push_transform(&mut self, dx: f32, dy: f32, radians: f32) {
        self.transforms.push(Transform {
            dx,
            dy,
            cos: radians.cos(),
            sin: radians.sin(),
        });
    }

    fn pop_transform(&mut self) {
        self.transforms.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(surface: &mut TerminalSurface) -> String {
        let mut out = Vec::new();
        surface.present(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_surface_units() {
        let surface = TerminalSurface::new(200, 50, Rgb::BLACK);
        assert_eq!((surface.width(), surface.height()), (1600.0, 800.0));
    }

    #[test]
    fn test_circle_lights_pixels_and_fade_dims_them() {
        let mut surface = TerminalSurface::new(10, 5, Rgb::BLACK);
        surface.fill_circle(20.0, 20.0, 3.0, Rgb(200, 100, 0), 1.0);
        assert_eq!(surface.shade(2 * 10 + 2), Rgb(200, 100, 0));

        surface.fade(Rgb::BLACK, 0.5);
        assert_eq!(surface.shade(2 * 10 + 2), Rgb(100, 50, 0));

        surface.clear(Rgb::BLACK);
        assert!(surface.pixels.iter().all(|p| *p == [0.0; 3]));
    }

    #[test]
    fn test_large_circle_covers_disc() {
        let mut surface = TerminalSurface::new(20, 10, Rgb::BLACK);
        surface.fill_circle(80.0, 80.0, 24.0, Rgb::WHITE, 1.0);
        let lit = surface.pixels.iter().filter(|p| p[0] > 0.0).count();
        // radius 3 pixels: roughly 28 pixels
        assert!((24..=32).contains(&lit), "lit {lit}");
    }

    #[test]
    fn test_offscreen_drawing_is_clipped() {
        let mut surface = TerminalSurface::new(4, 2, Rgb::BLACK);
        surface.fill_circle(-100.0, 5000.0, 40.0, Rgb::WHITE, 1.0);
        surface.fill_circle(1e9, -1e9, 0.5, Rgb::WHITE, 1.0);
        surface.fill_text("far away", -500.0, 10.0, &TextStyle::centered(20.0, "Arial", Rgb::WHITE));
        assert!(surface.pixels.iter().all(|p| *p == [0.0; 3]));
        assert!(surface.glyphs.iter().all(Option::is_none));
    }

    #[test]
    fn test_text_is_centered_and_most_opaque_pass_wins() {
        let mut surface = TerminalSurface::new(20, 4, Rgb::BLACK);
        let mut style = TextStyle::centered(30.0, "Arial", Rgb::WHITE);
        surface.fill_text("abcd", 80.0, 40.0, &style);

        style.color = Rgb::BLACK;
        style.alpha = 0.3;
        surface.fill_text("wxyz", 80.0, 40.0, &style);

        let row: String = (0..20)
            .map(|c| surface.glyphs[2 * 20 + c].map_or('.', |g| g.ch))
            .collect();
        assert_eq!(row, "........abcd........");
    }

    #[test]
    fn test_transform_moves_text() {
        let mut surface = TerminalSurface::new(20, 4, Rgb::BLACK);
        surface.push_transform(40.0, 24.0, std::f32::consts::FRAC_PI_2);
        surface.fill_text("*", 0.0, 0.0, &TextStyle::centered(10.0, "Arial", Rgb::WHITE));
        // rotated point (8, 0) lands 8 units lower
        surface.fill_text("+", 8.0, 0.0, &TextStyle::centered(10.0, "Arial", Rgb::WHITE));
        surface.pop_transform();

        assert_eq!(surface.glyphs[20 + 5].map(|g| g.ch), Some('*'));
        assert_eq!(surface.glyphs[2 * 20 + 5].map(|g| g.ch), Some('+'));
    }

    #[test]
    fn test_present_writes_cells_and_resets_overlay() {
        let mut surface = TerminalSurface::new(3, 2, Rgb(10, 20, 30));
        surface.fill_text("x", 12.0, 8.0, &TextStyle::centered(10.0, "Arial", Rgb::WHITE));

        let frame = rendered(&mut surface);
        assert!(frame.starts_with("\x1b[H"));
        assert!(frame.contains("\x1b[48;2;10;20;30m"));
        assert_eq!(frame.matches('x').count(), 1);
        assert_eq!(frame.matches('▄').count(), 5);
        assert_eq!(frame.matches("\r\n").count(), 1);

        let frame = rendered(&mut surface);
        assert_eq!(frame.matches('▄').count(), 6);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut surface = TerminalSurface::new(3, 2, Rgb::BLACK);
        surface.fill_circle(4.0, 4.0, 2.0, Rgb::WHITE, 1.0);
        surface.resize(1, 1);
        assert_eq!((surface.width(), surface.height()), (8.0, 16.0));
        surface.fill_circle(4.0, 12.0, 2.0, Rgb::WHITE, 1.0);
        assert_eq!(surface.shade(1), Rgb::WHITE);
        surface.resize(0, 0);
        surface.fill_circle(0.0, 0.0, 50.0, Rgb::WHITE, 1.0);
        surface.fade(Rgb::BLACK, 0.2);
        assert_eq!(rendered(&mut surface), "\x1b[H");
    }
}
