//! A display color keyed by mood.

use crate::prng::Seed;

pub const SATURATION: f64 = 0.45;
pub const LIGHTNESS: f64 = 0.60;

const HUE_SALT: u64 = 0x6875_65;

/// Hue in degrees, 0..360, derived from energy and valence only.
pub fn hue(energy: f64, valence: f64) -> u16 {
    (Seed::from_mood(energy, valence).mix(HUE_SALT).0 % 360) as u16
}

/// `#rrggbb` for a mood.
pub fn mood_color(energy: f64, valence: f64) -> String {
    let (r, g, b) = hsl_to_rgb(hue(energy, valence) as f64, SATURATION, LIGHTNESS);
    format!("#{r:02x}{g:02x}{b:02x}")
}

pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r), channel(g), channel(b))
}
