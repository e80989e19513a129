use super::{Effect, Frame};
use crate::color::Rgb;
use crate::surface::Surface;

const GRAVITY: f32 = 0.2;
const DRAG: f32 = 0.98;
// Burst particles start at this opacity and fade linearly with life
const BURST_PEAK_ALPHA: f32 = 0.8;

const HOMING_SPEED: f32 = 6.0;
const HOMING_RADIUS: f32 = 1.5;
const FADE_IN_STEP: f32 = 0.05;
const ARRIVAL_EPSILON: f32 = 0.1;
const FADE_OUT_LIFE: f32 = 30.0;
const FADE_OUT_DECAY: f32 = 0.9;

const GLOW_SCALE: f32 = 2.0;
const GLOW_ALPHA: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Ballistic: launched radially, pulled by gravity, slowed by drag.
    Burst { vx: f32, vy: f32, max_life: f32 },
    /// Eases towards a fixed point once its delay (in frames) runs out.
    Homing {
        target_x: f32,
        target_y: f32,
        speed: f32,
        delay: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Remaining frames.
    pub life: f32,
    pub alpha: f32,
    pub radius: f32,
    pub color: Rgb,
    pub motion: Motion,
}

impl Particle {
    pub fn burst(x: f32, y: f32, angle: f32, speed: f32, life: f32, radius: f32, color: Rgb) -> Self {
        Self {
            x,
            y,
            life,
            alpha: BURST_PEAK_ALPHA,
            radius,
            color,
            motion: Motion::Burst {
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                max_life: life,
            },
        }
    }

    pub fn homing(x: f32, y: f32, target: (f32, f32), life: f32, delay: f32, color: Rgb) -> Self {
        Self {
            x,
            y,
            life,
            alpha: 0.0,
            radius: HOMING_RADIUS,
            color,
            motion: Motion::Homing {
                target_x: target.0,
                target_y: target.1,
                speed: HOMING_SPEED,
                delay,
            },
        }
    }

    /// Advances one frame.
    pub fn step(&mut self) {
        match &mut self.motion {
            Motion::Burst { vx, vy, max_life } => {
                self.x += *vx;
                self.y += *vy;
                *vy += GRAVITY;
                *vx *= DRAG;
                self.life -= 1.0;
                self.alpha = (self.life / *max_life) * BURST_PEAK_ALPHA;
            }
            Motion::Homing {
                target_x,
                target_y,
                speed,
                delay,
            } => {
                if *delay > 0.0 {
                    *delay -= 1.0;
                    return;
                }

                if self.alpha < 1.0 {
                    self.alpha = (self.alpha + FADE_IN_STEP).min(1.0);
                }

                let dx = *target_x - self.x;
                let dy = *target_y - self.y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance > ARRIVAL_EPSILON {
                    self.x += dx / distance * *speed;
                    self.y += dy / distance * *speed;
                }

                self.life -= 1.0;
                if self.life < FADE_OUT_LIFE {
                    self.alpha *= FADE_OUT_DECAY;
                }
            }
        }
    }

    /// Still waiting on its activation delay.
    pub fn is_dormant(&self) -> bool {
        matches!(self.motion, Motion::Homing { delay, .. } if delay > 0.0)
    }

    pub fn is_expired(&self) -> bool {
        self.life <= 0.0
    }
}

impl Effect for Particle {
    fn update(&mut self, _frame: &Frame) {
        self.step();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if self.is_dormant() || self.alpha <= 0.0 {
            return;
        }
        let alpha = self.alpha.clamp(0.0, 1.0);
        surface.fill_circle(self.x, self.y, self.radius, self.color, alpha);
        surface.fill_circle(self.x, self.y, self.radius * GLOW_SCALE, self.color, alpha * GLOW_ALPHA);
    }

    fn is_alive(&self) -> bool {
        !self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, Recorder};

    fn burst(life: f32) -> Particle {
        Particle::burst(100.0, 100.0, 0.0, 10.0, life, 2.0, Rgb::WHITE)
    }

    #[test]
    fn test_burst_integration() {
        let mut p = burst(50.0);
        p.step();
        assert_eq!((p.x, p.y), (110.0, 100.0));
        p.step();
        assert!((p.x - 119.8).abs() < 1e-4);
        assert!((p.y - 100.2).abs() < 1e-4);
        assert_eq!(p.life, 48.0);
        assert!((p.alpha - 48.0 / 50.0 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_burst_starts_at_peak_alpha() {
        let p = burst(50.0);
        assert_eq!(p.alpha, BURST_PEAK_ALPHA);

        let mut rec = Recorder::new(200.0, 200.0);
        p.draw(&mut rec);
        assert!(matches!(rec.ops()[0], DrawOp::Circle { alpha, .. } if alpha == BURST_PEAK_ALPHA));
    }

    #[test]
    fn test_burst_alpha_never_increases() {
        let mut p = burst(42.5);
        let mut last = f32::INFINITY;
        while !p.is_expired() {
            p.step();
            assert!(p.alpha <= last);
            last = p.alpha;
        }
    }

    #[test]
    fn test_burst_expires_exactly_when_life_runs_out() {
        for life in [1.0_f32, 3.0, 40.0, 57.3] {
            let mut p = burst(life);
            let mut frames = 0;
            while p.is_alive() {
                p.step();
                frames += 1;
            }
            assert_eq!(frames, life.ceil() as i32, "life {life}");
        }
    }

    #[test]
    fn test_homing_frozen_while_delayed() {
        let mut p = Particle::homing(0.0, 0.0, (60.0, 80.0), 150.0, 2.5, Rgb::WHITE);
        p.step();
        p.step();
        assert!(p.is_dormant());
        assert_eq!((p.x, p.y, p.alpha, p.life), (0.0, 0.0, 0.0, 150.0));

        let mut rec = Recorder::new(100.0, 100.0);
        p.draw(&mut rec);
        assert!(rec.ops().is_empty());

        p.step(); // delay 0.5 -> -0.5, still frozen this frame
        assert_eq!((p.x, p.y), (0.0, 0.0));
        assert!(!p.is_dormant());
        p.draw(&mut rec);
        assert!(rec.ops().is_empty(), "invisible particle was drawn");
        p.step();
        assert!(!p.is_dormant());
        assert!((p.x - 3.6).abs() < 1e-4);
        assert!((p.y - 4.8).abs() < 1e-4);
        assert!((p.alpha - 0.05).abs() < 1e-6);
        assert_eq!(p.life, 149.0);
    }

    #[test]
    fn test_homing_settles_near_target() {
        let mut p = Particle::homing(0.0, 0.0, (30.0, -40.0), 150.0, 0.0, Rgb::WHITE);
        for _ in 0..40 {
            p.step();
            assert!(p.alpha <= 1.0);
        }
        let d = ((p.x - 30.0).powi(2) + (p.y + 40.0).powi(2)).sqrt();
        assert!(d <= HOMING_SPEED);
        assert_eq!(p.alpha, 1.0);
    }

    #[test]
    fn test_homing_fades_out_and_expires() {
        let mut p = Particle::homing(5.0, 5.0, (5.0, 5.0), 60.0, 0.0, Rgb::WHITE);
        for _ in 0..25 {
            p.step();
        }
        assert_eq!(p.alpha, 1.0);
        assert_eq!((p.x, p.y), (5.0, 5.0));

        let mut last = p.alpha;
        while p.is_alive() {
            p.step();
            if p.life < FADE_OUT_LIFE {
                assert!(p.alpha < last);
            }
            last = p.alpha;
        }
        assert_eq!(p.life, 0.0);
        // fade-in keeps pulling against the decay, so it levels off near 0.45
        assert!(p.alpha < 0.5);
    }

    #[test]
    fn test_draw_core_and_glow() {
        let mut p = burst(10.0);
        p.alpha = 0.5;
        let mut rec = Recorder::new(100.0, 100.0);
        p.draw(&mut rec);
        assert_eq!(
            rec.ops(),
            &[
                DrawOp::Circle { x: 100.0, y: 100.0, radius: 2.0, color: Rgb::WHITE, alpha: 0.5 },
                DrawOp::Circle { x: 100.0, y: 100.0, radius: 4.0, color: Rgb::WHITE, alpha: 0.15 },
            ]
        );
    }
}
