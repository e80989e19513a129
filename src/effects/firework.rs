use super::particle::{Motion, Particle};
use super::{Effect, Frame};
use crate::color::{self, FIREWORK_COLORS, Rgb};
use crate::surface::Surface;
use std::collections::VecDeque;
use std::f32::consts::TAU;
use tracing::debug;

// Frames from launch to the target height
const TRANSIT_STEPS: u32 = 50;
const TRAIL_LENGTH: usize = 10;
const EXPLODE_DISTANCE: f32 = 5.0;
// Targets never come closer than this to the top edge
const TARGET_TOP_MARGIN: f32 = 100.0;

const HEAD_RADIUS: f32 = 3.0;
const TRAIL_PEAK_ALPHA: f32 = 0.5;

const BURST_PARTICLES: usize = 120;
const HEARTS: usize = 2;
const HEART_BASE_SIZE: f32 = 12.0;
const HEART_STEP_DEGREES: usize = 3;
// Share of heart particles painted in the heart's own color
const HEART_COLOR_BIAS: f32 = 0.8;
const HEART_JITTER: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Ascending,
    Exploded,
}

/// A shell that climbs to its target and bursts into a ring of sparks plus
/// two hearts assembled from homing particles.
#[derive(Debug)]
pub struct Firework {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    target_x: f32,
    target_y: f32,
    steps: u32,
    trail: VecDeque<(f32, f32)>,
    phase: Phase,
    // Set on the frame of the explosion, which still shows the rocket
    just_exploded: bool,
    particles: Vec<Particle>,
    color: Rgb,
}

impl Firework {
    /// Random launch from the bottom edge towards the upper half.
    pub fn launch(width: f32, height: f32) -> Self {
        let start = (fastrand::f32() * width, height);
        let target = (
            fastrand::f32() * width,
            fastrand::f32() * (height / 2.0) + TARGET_TOP_MARGIN,
        );
        Self::with_path(start, target, color::pick(&FIREWORK_COLORS))
    }

    pub fn with_path(start: (f32, f32), target: (f32, f32), color: Rgb) -> Self {
        let steps = TRANSIT_STEPS as f32;
        Self {
            x: start.0,
            y: start.1,
            vx: (target.0 - start.0) / steps,
            vy: (target.1 - start.1) / steps,
            target_x: target.0,
            target_y: target.1,
            steps: 0,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
            phase: Phase::Ascending,
            just_exploded: false,
            particles: Vec::new(),
            color,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn target(&self) -> (f32, f32) {
        (self.target_x, self.target_y)
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn trail(&self) -> &VecDeque<(f32, f32)> {
        &self.trail
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advances one frame: climbs while ascending, otherwise moves the
    /// particles and drops the expired ones.
    pub fn step(&mut self) {
        match self.phase {
            Phase::Ascending => {
                self.trail.push_back((self.x, self.y));
                if self.trail.len() > TRAIL_LENGTH {
                    self.trail.pop_front();
                }

                self.x += self.vx;
                self.y += self.vy;
                self.steps += 1;

                if (self.y - self.target_y).abs() < EXPLODE_DISTANCE || self.steps >= TRANSIT_STEPS {
                    self.explode();
                }
            }
            Phase::Exploded => {
                self.just_exploded = false;
                self.trail.clear();
                for particle in &mut self.particles {
                    particle.step();
                }
                self.particles.retain(|p| !p.is_expired());
            }
        }
    }

    fn explode(&mut self) {
        self.phase = Phase::Exploded;
        self.just_exploded = true;
        self.particles.reserve(BURST_PARTICLES + HEARTS * 360 / HEART_STEP_DEGREES);

        for _ in 0..BURST_PARTICLES {
            let angle = fastrand::f32() * TAU;
            let speed = 8.0 + fastrand::f32() * 6.0;
            let life = 40.0 + fastrand::f32() * 20.0;
            let radius = 2.0 + fastrand::f32() * 2.0;
            self.particles.push(Particle::burst(
                self.x,
                self.y,
                angle,
                speed,
                life,
                radius,
                color::pick(&FIREWORK_COLORS),
            ));
        }

        for h in 0..HEARTS {
            let angle = TAU * h as f32 / HEARTS as f32;
            let distance = 60.0 + fastrand::f32() * 80.0;
            let center_x = self.x + angle.cos() * distance;
            let center_y = self.y + angle.sin() * distance;
            let heart_color = color::pick(&FIREWORK_COLORS);
            let size = HEART_BASE_SIZE * (0.8 + fastrand::f32() * 0.4);

            for (dx, dy) in heart_outline(size) {
                let particle_color = if fastrand::f32() < HEART_COLOR_BIAS {
                    heart_color
                } else {
                    color::pick(&FIREWORK_COLORS)
                };
                self.particles.push(Particle::homing(
                    self.x + (fastrand::f32() - 0.5) * HEART_JITTER,
                    self.y + (fastrand::f32() - 0.5) * HEART_JITTER,
                    (center_x + dx, center_y + dy),
                    150.0 + fastrand::f32() * 20.0,
                    fastrand::f32() * 20.0,
                    particle_color,
                ));
            }
        }

        debug!(
            x = self.x,
            y = self.y,
            particles = self.particles.len(),
            "firework exploded"
        );
    }

    /// Number of homing particles still waiting to start.
    pub fn dormant_particles(&self) -> usize {
        self.particles.iter().filter(|p| p.is_dormant()).count()
    }

    fn draw_rocket(&self, surface: &mut dyn Surface) {
        // Oldest position is the faintest
        for (index, &(x, y)) in self.trail.iter().enumerate() {
            let alpha = index as f32 / TRAIL_LENGTH as f32 * TRAIL_PEAK_ALPHA;
            surface.fill_circle(x, y, HEAD_RADIUS, Rgb::WHITE, alpha);
        }
        surface.fill_circle(self.x, self.y, HEAD_RADIUS, self.color, 1.0);
    }

    pub fn burst_particles(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| matches!(p.motion, Motion::Burst { .. }))
            .count()
    }
}

impl Effect for Firework {
    fn update(&mut self, _frame: &Frame) {
        self.step();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if self.phase == Phase::Ascending || self.just_exploded {
            self.draw_rocket(surface);
            return;
        }
        for particle in &self.particles {
            particle.draw(surface);
        }
    }

    fn is_alive(&self) -> bool {
        self.phase == Phase::Ascending || !self.particles.is_empty()
    }
}

/// Offsets of the parametric heart curve, sampled every 3 degrees.
///
/// x = size * 16 sin^3 t, y = -size * (13 cos t - 5 cos 2t - 2 cos 3t - cos 4t)
/// with y pointing down, so the lobes end up on top.
pub fn heart_outline(size: f32) -> Vec<(f32, f32)> {
    (0..360)
        .step_by(HEART_STEP_DEGREES)
        .map(|deg| {
            let t = (deg as f32).to_radians();
            let x = size * 16.0 * t.sin().powi(3);
            let y = -size
                * (13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos());
            (x, y)
        })
        .collect()
}
