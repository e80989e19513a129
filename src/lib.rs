//! Countdown, fireworks and fading messages, rendered in the terminal.
//!
//! The [`show::Show`] sequencer drives everything against an abstract
//! [`surface::Surface`]; [`terminal::TerminalSurface`] paints it with
//! half-block characters and [`surface::Recorder`] captures it for tests.

pub mod clock;
pub mod color;
pub mod config;
pub mod effects;
pub mod error;
pub mod show;
pub mod surface;
pub mod terminal;
pub mod timer;

pub use clock::{Clock, FramePacer, ManualClock, SystemClock};
pub use color::Rgb;
pub use config::{CountdownSettings, MessageSettings, ShowConfig};
pub use error::{Result, ShowError};
pub use show::{FrameReport, MessageFrame, Phase, Show, ShowStats};
pub use surface::{DrawOp, Recorder, Surface, TextStyle};
pub use terminal::TerminalSurface;
