use crate::color::Rgb;
use crate::config::{MessageSettings, ShowConfig};
use crate::surface::{Shadow, Surface, TextStyle};

const GLOW_PASSES: u32 = 5;
const MAX_GLOW_BLUR: f32 = 60.0;
const SHADOW_OFFSET: f32 = 3.0;
const HIGHLIGHT_LIFT: f32 = 2.0;

/// Which message is showing and how opaque it is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MessageFrame {
    pub index: usize,
    pub alpha: f32,
}

/// Opacity at `slot_elapsed` ms into a message slot of `duration` ms:
/// linear ramp up over the first `fade` ms, linear ramp down over the last
/// `fade` ms, opaque in between.
pub fn fade_alpha(slot_elapsed: u64, duration: u64, fade: u64) -> f32 {
    if fade == 0 {
        return 1.0;
    }
    let alpha = if slot_elapsed < fade {
        slot_elapsed as f32 / fade as f32
    } else if slot_elapsed > duration.saturating_sub(fade) {
        duration.saturating_sub(slot_elapsed) as f32 / fade as f32
    } else {
        1.0
    };
    alpha.clamp(0.0, 1.0)
}

/// Message showing `elapsed` ms into the cycle, or `None` once every message
/// has had its slot.
pub fn message_at(elapsed: u64, config: &ShowConfig) -> Option<MessageFrame> {
    let duration = config.message.duration_ms;
    if duration == 0 || elapsed >= config.cycle_ms() {
        return None;
    }
    Some(MessageFrame {
        index: (elapsed / duration) as usize,
        alpha: fade_alpha(elapsed % duration, duration, config.message.fade_ms),
    })
}

/// Paints a message centered on the surface, shifted by `drift`: stacked
/// glow passes, a drop shadow, the fill, then a faint highlight.
pub(crate) fn draw_message(
    surface: &mut dyn Surface,
    text: &str,
    frame: MessageFrame,
    settings: &MessageSettings,
    drift: (f32, f32),
) {
    let alpha = frame.alpha;
    let (color, glow) = settings.palette(frame.index);
    let x = surface.width() / 2.0 + drift.0;
    let y = surface.height() / 2.0 + drift.1;

    let mut style = TextStyle {
        bold: true,
        shadow: Some(Shadow {
            color: glow,
            blur: MAX_GLOW_BLUR * alpha,
        }),
        ..TextStyle::centered(settings.font_size * (0.7 + alpha * 0.3), &settings.font_family, glow)
    };

    for pass in (1..=GLOW_PASSES).rev() {
        style.alpha = alpha * 0.1 / pass as f32;
        surface.fill_text(text, x, y, &style);
    }

    style.color = Rgb::BLACK;
    style.alpha = alpha * 0.5;
    surface.fill_text(text, x + SHADOW_OFFSET, y + SHADOW_OFFSET, &style);

    style.color = color;
    style.alpha = alpha;
    surface.fill_text(text, x, y, &style);

    style.color = Rgb::WHITE;
    style.alpha = alpha * 0.4;
    surface.fill_text(text, x, y - HIGHLIGHT_LIFT, &style);
}
