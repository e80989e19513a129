//! Error types for show configuration and the terminal driver.

use thiserror::Error;

/// Result type for show operations.
pub type Result<T> = std::result::Result<T, ShowError>;

/// Errors reported while configuring or running a show.
#[derive(Error, Debug)]
pub enum ShowError {
    /// The message sequence has no entries.
    #[error("message sequence is empty")]
    NoMessages,

    /// A color palette has no entries.
    #[error("{0} palette is empty")]
    EmptyPalette(&'static str),

    /// Messages must be displayed for a positive duration.
    #[error("message duration must be positive")]
    ZeroDuration,

    /// The fade-in and fade-out windows overlap.
    #[error("fade window of {fade_ms}ms does not fit twice in a {duration_ms}ms message slot")]
    FadeTooLong { fade_ms: u64, duration_ms: u64 },

    /// A color string is not `RRGGBB` hex.
    #[error("invalid hex color: {0}")]
    InvalidColor(String),

    /// IO error while reading configuration or writing frames.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for a show.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
