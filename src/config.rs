//! Show configuration.
//!
//! Everything has a default, so a TOML file only needs the fields it wants
//! to change:
//!
//! ```toml
//! messages = ["Happy birthday", "See you soon"]
//!
//! [message]
//! duration_ms = 4000
//! colors = ["E74C3C", "3498DB"]
//! ```

use crate::color::{MESSAGE_COLORS, MESSAGE_GLOW_COLORS, Rgb};
use crate::error::{Result, ShowError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

const DEFAULT_MESSAGES: [&str; 5] = [
    "cie kate balik pondok arek e",
    "kenal samean asik yo bakne",
    "tetep semangat belajar nde pondok",
    "sok nk muleh ojo lali karo om tampan iki yo",
    "maksih, TAK TUNGGU BALIMU",
];

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessageSettings {
    /// Display slot per message.
    pub duration_ms: u64,
    /// Length of the fade-in and of the fade-out inside each slot.
    pub fade_ms: u64,
    pub font_size: f32,
    pub font_family: String,
    /// Fill colors, indexed by message position modulo length.
    pub colors: Vec<Rgb>,
    /// Glow colors, indexed the same way as `colors`.
    pub glow_colors: Vec<Rgb>,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            duration_ms: 5000,
            fade_ms: 500,
            font_size: 55.0,
            font_family: "Arial".to_string(),
            colors: MESSAGE_COLORS.to_vec(),
            glow_colors: MESSAGE_GLOW_COLORS.to_vec(),
        }
    }
}

impl MessageSettings {
    pub fn validate(&self) -> Result<()> {
        if self.duration_ms == 0 {
            return Err(ShowError::ZeroDuration);
        }
        if self.fade_ms.saturating_mul(2) > self.duration_ms {
            return Err(ShowError::FadeTooLong {
                fade_ms: self.fade_ms,
                duration_ms: self.duration_ms,
            });
        }
        if self.colors.is_empty() {
            return Err(ShowError::EmptyPalette("message color"));
        }
        if self.glow_colors.is_empty() {
            return Err(ShowError::EmptyPalette("message glow"));
        }
        Ok(())
    }

    /// Fill and glow color for the message at `index`.
    pub fn palette(&self, index: usize) -> (Rgb, Rgb) {
        (
            self.colors[index % self.colors.len()],
            self.glow_colors[index % self.glow_colors.len()],
        )
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CountdownSettings {
    /// First number shown; 0 skips straight to the messages.
    pub from: u32,
    pub tick_ms: u64,
    /// Pause between reaching zero and the first message.
    pub pause_ms: u64,
    pub caption: String,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            from: 10,
            tick_ms: 1000,
            pause_ms: 500,
            caption: "✦ Bersiaplah... ✦".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    pub messages: Vec<String>,
    pub message: MessageSettings,
    pub countdown: CountdownSettings,
    /// Minimum time between two firework launches.
    pub launch_interval_ms: u64,
    /// Delay between the end of the message cycle and the next countdown.
    pub restart_delay_ms: u64,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect(),
            message: MessageSettings::default(),
            countdown: CountdownSettings::default(),
            launch_interval_ms: 1000,
            restart_delay_ms: 300,
        }
    }
}

impl ShowConfig {
    /// Default settings with the given messages.
    pub fn with_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.messages.is_empty() {
            return Err(ShowError::NoMessages);
        }
        self.message.validate()
    }

    /// Length of one full pass over the messages.
    pub fn cycle_ms(&self) -> u64 {
        self.message.duration_ms.saturating_mul(self.messages.len() as u64)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ShowConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!(
            path = %path.display(),
            messages = config.messages.len(),
            "loaded show config"
        );
        Ok(config)
    }
}
