//! The show sequencer.
//!
//! A [`Show`] owns every piece of mutable state (phase, timers, fireworks,
//! ambient layer) and is advanced by calling [`Show::tick`] once per frame
//! with the current clock time. Phases loop forever:
//!
//! ```text
//! Countdown(n) --n ticks--> Intermission --pause--> Messages --cycle--> Finale --delay--> Countdown(n)
//! ```
//!
//! Fireworks launch on their own cadence in every phase.

mod countdown;
mod message;

pub use message::{MessageFrame, fade_alpha, message_at};

use crate::color::Rgb;
use crate::config::{MessageSettings, ShowConfig};
use crate::effects::ambient::AmbientLayer;
use crate::effects::firework::Firework;
use crate::effects::{Effect, Frame};
use crate::error::Result;
use crate::surface::Surface;
use crate::timer::{TimerId, Timers};
use noise::{NoiseFn, Perlin};
use tracing::{debug, info, warn};

const COUNTDOWN_OVERLAY: f32 = 0.2;
const MESSAGE_OVERLAY: f32 = 0.15;

// Message hover amplitude in surface units
const DRIFT_X: f32 = 5.0;
const DRIFT_Y: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Not started yet.
    Idle,
    Countdown { remaining: u32 },
    /// Countdown reached zero; the first message is pending.
    Intermission,
    Messages { started_at: u64 },
    /// Every message has been shown; the restart is pending.
    Finale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cue {
    CountdownTick,
    BeginMessages,
    Restart,
}

/// Running totals since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShowStats {
    pub frames: u64,
    pub countdown_ticks: u64,
    pub launches: u64,
    pub cycles: u64,
    pub restarts: u64,
}

/// Outcome of one [`Show::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub phase: Phase,
    pub launched: bool,
    pub fireworks: usize,
    pub message: Option<MessageFrame>,
}

pub struct Show {
    config: ShowConfig,
    phase: Phase,
    timers: Timers<Cue>,
    countdown_timer: Option<TimerId>,
    fireworks: Vec<Firework>,
    last_launch: Option<u64>,
    ambient: AmbientLayer,
    message: Option<MessageFrame>,
    drift: Perlin,
    stats: ShowStats,
}

impl Show {
    /// Fails if the configuration is unusable, e.g. has no messages.
    pub fn new(config: ShowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Idle,
            timers: Timers::new(),
            countdown_timer: None,
            fireworks: Vec::new(),
            last_launch: None,
            ambient: AmbientLayer::new(),
            message: None,
            drift: Perlin::new(fastrand::u32(..)),
            stats: ShowStats::default(),
        })
    }

    pub fn config(&self) -> &ShowConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> ShowStats {
        self.stats
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn ambient(&self) -> &AmbientLayer {
        &self.ambient
    }

    /// Message drawn by the latest frame, if any.
    pub fn message(&self) -> Option<MessageFrame> {
        self.message
    }

    pub fn set_messages(&mut self, messages: Vec<String>) -> Result<()> {
        let config = ShowConfig {
            messages,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_message_settings(&mut self, settings: MessageSettings) -> Result<()> {
        settings.validate()?;
        self.config.message = settings;
        Ok(())
    }

    /// Starts (or restarts) the sequence from the countdown. Fireworks
    /// already in flight keep going.
    pub fn start(&mut self, now: u64) {
        self.timers.clear();
        self.countdown_timer = None;
        self.begin_countdown(now);
    }

    /// Advances one frame and paints it.
    ///
    /// Paint order: fading overlay, ambient layer, fireworks, then the
    /// countdown or message text on top.
    pub fn tick(&mut self, now: u64, surface: &mut dyn Surface) -> FrameReport {
        if self.phase == Phase::Idle {
            self.start(now);
        }
        while let Some((_, cue)) = self.timers.pop_due(now) {
            self.handle(cue, now, surface);
        }

        let frame = Frame::new(now, surface);
        let overlay = match self.phase {
            Phase::Messages { .. } => MESSAGE_OVERLAY,
            _ => COUNTDOWN_OVERLAY,
        };
        surface.fade(Rgb::BLACK, overlay);

        if matches!(self.phase, Phase::Messages { .. }) {
            self.ambient.update(&frame);
            self.ambient.draw(surface);
        }

        let launched = self.launch(&frame);
        for firework in &mut self.fireworks {
            firework.update(&frame);
            firework.draw(surface);
        }
        self.fireworks.retain(|fw| fw.is_alive());

        self.message = None;
        match self.phase {
            Phase::Countdown { remaining } => {
                countdown::draw_countdown(surface, remaining, now, &self.config.countdown);
            }
            Phase::Messages { started_at } => {
                let elapsed = now.saturating_sub(started_at);
                match message_at(elapsed, &self.config) {
                    Some(current) => {
                        let drift = self.drift_at(now);
                        message::draw_message(
                            surface,
                            &self.config.messages[current.index],
                            current,
                            &self.config.message,
                            drift,
                        );
                        self.message = Some(current);
                    }
                    None => self.finish_cycle(now),
                }
            }
            Phase::Idle | Phase::Intermission | Phase::Finale => {}
        }

        self.stats.frames += 1;
        FrameReport {
            phase: self.phase,
            launched,
            fireworks: self.fireworks.len(),
            message: self.message,
        }
    }

    fn handle(&mut self, cue: Cue, now: u64, surface: &mut dyn Surface) {
        match cue {
            Cue::CountdownTick => self.countdown_tick(now),
            Cue::BeginMessages => {
                self.ambient.scatter(surface.width(), surface.height());
                surface.clear(Rgb::BLACK);
                self.phase = Phase::Messages { started_at: now };
                info!(now, messages = self.config.messages.len(), "message cycle started");
            }
            Cue::Restart => {
                self.stats.restarts += 1;
                info!(now, restarts = self.stats.restarts, "restarting show");
                self.begin_countdown(now);
            }
        }
    }

    fn begin_countdown(&mut self, now: u64) {
        self.ambient.clear();
        let settings = &self.config.countdown;
        if settings.from == 0 {
            self.enter_intermission(now);
            return;
        }
        self.phase = Phase::Countdown { remaining: settings.from };
        self.countdown_timer = Some(self.timers.every(now, settings.tick_ms, Cue::CountdownTick));
        info!(now, from = settings.from, "countdown started");
    }

    fn countdown_tick(&mut self, now: u64) {
        let Phase::Countdown { remaining } = self.phase else {
            warn!(now, phase = ?self.phase, "countdown tick outside countdown");
            self.cancel_countdown();
            return;
        };

        let remaining = remaining.saturating_sub(1);
        self.phase = Phase::Countdown { remaining };
        self.stats.countdown_ticks += 1;
        debug!(now, remaining, "countdown tick");

        if remaining == 0 {
            self.cancel_countdown();
            self.enter_intermission(now);
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(id) = self.countdown_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn enter_intermission(&mut self, now: u64) {
        self.phase = Phase::Intermission;
        self.timers.after(now, self.config.countdown.pause_ms, Cue::BeginMessages);
    }

    fn finish_cycle(&mut self, now: u64) {
        self.phase = Phase::Finale;
        self.stats.cycles += 1;
        self.ambient.clear();
        self.timers.after(now, self.config.restart_delay_ms, Cue::Restart);
        info!(now, cycles = self.stats.cycles, "message cycle complete");
    }

    /// Launches at most one firework per launch interval.
    fn launch(&mut self, frame: &Frame) -> bool {
        let interval = self.config.launch_interval_ms;
        let due = self
            .last_launch
            .is_none_or(|last| frame.now.saturating_sub(last) >= interval);
        if !due {
            return false;
        }

        let firework = Firework::launch(frame.width, frame.height);
        debug!(
            now = frame.now,
            target = ?firework.target(),
            color = %firework.color(),
            "firework launched"
        );
        self.fireworks.push(firework);
        self.last_launch = Some(frame.now);
        self.stats.launches += 1;
        true
    }

    fn drift_at(&self, now: u64) -> (f32, f32) {
        let t = now as f64 / 1000.0;
        let x = self.drift.get([t * 0.4, 0.0]) as f32 * DRIFT_X;
        let y = self.drift.get([t * 0.6, 10.0]) as f32 * DRIFT_Y;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShowError;
    use crate::surface::{DrawOp, Recorder};

    fn quick_config() -> ShowConfig {
        let mut config = ShowConfig::with_messages(["one", "two", "three"]);
        config.countdown.from = 3;
        config.message.duration_ms = 1000;
        config.message.fade_ms = 200;
        config
    }

    fn run_until(show: &mut Show, rec: &mut Recorder, from: u64, to: u64) -> Vec<FrameReport> {
        (from..=to).step_by(100).map(|t| show.tick(t, rec)).collect()
    }

    #[test]
    fn test_new_rejects_empty_messages() {
        let config = ShowConfig::with_messages(Vec::<String>::new());
        assert!(matches!(Show::new(config), Err(ShowError::NoMessages)));
    }

    #[test]
    fn test_set_messages_validates() {
        let mut show = Show::new(quick_config()).unwrap();
        assert!(show.set_messages(Vec::new()).is_err());
        assert_eq!(show.config().messages.len(), 3);

        show.set_messages(vec!["solo".to_string()]).unwrap();
        assert_eq!(show.config().cycle_ms(), 1000);

        let bad = MessageSettings { fade_ms: 600, ..show.config().message.clone() };
        assert!(show.set_message_settings(bad).is_err());
    }

    #[test]
    fn test_first_tick_starts_countdown() {
        let mut show = Show::new(quick_config()).unwrap();
        let mut rec = Recorder::new(800.0, 600.0);
        assert_eq!(show.phase(), Phase::Idle);

        let report = show.tick(0, &mut rec);
        assert_eq!(report.phase, Phase::Countdown { remaining: 3 });
        assert!(rec.texts().any(|t| t == "3"));
    }

    #[test]
    fn test_entering_messages_clears_and_scatters() {
        let mut show = Show::new(quick_config()).unwrap();
        let mut rec = Recorder::new(800.0, 600.0);
        run_until(&mut show, &mut rec, 0, 3400);
        assert_eq!(show.phase(), Phase::Intermission);
        assert!(show.ambient().sparkles().is_empty());

        rec.take();
        let report = show.tick(3500, &mut rec);
        assert_eq!(report.phase, Phase::Messages { started_at: 3500 });
        assert!(!show.ambient().sparkles().is_empty());
        assert_eq!(
            rec.ops()[0],
            DrawOp::Rect { x: 0.0, y: 0.0, w: 800.0, h: 600.0, color: Rgb::BLACK, alpha: 1.0 }
        );
        assert!(matches!(rec.ops()[1], DrawOp::Rect { alpha, .. } if alpha == MESSAGE_OVERLAY));
    }

    #[test]
    fn test_endless_restart_delay_stays_in_finale() {
        let mut config = quick_config();
        config.restart_delay_ms = u64::MAX;
        let mut show = Show::new(config).unwrap();
        let mut rec = Recorder::new(800.0, 600.0);

        let reports = run_until(&mut show, &mut rec, 0, 9000);
        assert_eq!(reports.last().map(|r| r.phase), Some(Phase::Finale));
        assert_eq!(show.stats().cycles, 1);
        assert_eq!(show.stats().restarts, 0);
    }

    #[test]
    fn test_countdown_from_zero_skips_to_messages() {
        let mut config = quick_config();
        config.countdown.from = 0;
        let mut show = Show::new(config).unwrap();
        let mut rec = Recorder::new(800.0, 600.0);

        assert_eq!(show.tick(0, &mut rec).phase, Phase::Intermission);
        assert_eq!(show.tick(500, &mut rec).phase, Phase::Messages { started_at: 500 });
        assert_eq!(show.stats().countdown_ticks, 0);
    }

    #[test]
    fn test_full_loop_restarts_countdown() {
        let mut show = Show::new(quick_config()).unwrap();
        let mut rec = Recorder::new(800.0, 600.0);

        // 3 ticks + 500ms pause + 3 messages + 300ms restart delay
        let reports = run_until(&mut show, &mut rec, 0, 7000);
        let finale = reports.iter().position(|r| r.phase == Phase::Finale).unwrap();
        assert_eq!(finale, 65);
        assert_eq!(reports[68].phase, Phase::Countdown { remaining: 3 });
        assert_eq!(show.stats().cycles, 1);
        assert_eq!(show.stats().restarts, 1);

        let shown: Vec<usize> = reports.iter().filter_map(|r| r.message.map(|m| m.index)).collect();
        assert_eq!(shown.first(), Some(&0));
        assert_eq!(shown.last(), Some(&2));
        assert_eq!(shown.len(), 30);
    }
}
