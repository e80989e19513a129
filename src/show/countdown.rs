use crate::color::Rgb;
use crate::config::CountdownSettings;
use crate::surface::{Shadow, Surface, TextStyle};

const NUMERAL_SIZE: f32 = 150.0;
const CAPTION_SIZE: f32 = 30.0;
const CAPTION_OFFSET: f32 = 120.0;
const FONT: &str = "Arial";

/// Pulsing numeral with a caption underneath.
pub(crate) fn draw_countdown(surface: &mut dyn Surface, remaining: u32, now: u64, settings: &CountdownSettings) {
    let pulse = 1.0 + (now as f64 * 0.01).sin() as f32 * 0.1;
    let x = surface.width() / 2.0;
    let y = surface.height() / 2.0;

    let numeral = TextStyle {
        bold: true,
        shadow: Some(Shadow { color: Rgb::GOLD, blur: 60.0 }),
        ..TextStyle::centered(NUMERAL_SIZE * pulse, FONT, Rgb::WHITE)
    };
    surface.fill_text(&remaining.to_string(), x, y, &numeral);

    let caption = TextStyle {
        bold: true,
        shadow: Some(Shadow { color: Rgb::GOLD, blur: 20.0 }),
        ..TextStyle::centered(CAPTION_SIZE, FONT, Rgb::GOLD)
    };
    surface.fill_text(&settings.caption, x, y + CAPTION_OFFSET, &caption);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, Recorder};

    #[test]
    fn test_numeral_pulses_within_ten_percent() {
        let settings = CountdownSettings::default();
        for now in (0..2000).step_by(37) {
            let mut rec = Recorder::new(1000.0, 800.0);
            draw_countdown(&mut rec, 7, now, &settings);
            match &rec.ops()[0] {
                DrawOp::Text { text, size, x, y, .. } => {
                    assert_eq!(text, "7");
                    assert!(*size >= 135.0 - 1e-3 && *size <= 165.0 + 1e-3);
                    assert_eq!((*x, *y), (500.0, 400.0));
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(rec.texts().nth(1), Some(settings.caption.as_str()));
        }
    }
}
