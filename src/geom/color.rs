//! RGB colors for trims and stack groups.

/// Linear RGB color with components in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Hue step between consecutively created groups (golden ratio conjugate).
pub const GOLDEN_RATIO_HUE: f64 = 0.618034;

/// Convert HSV (all components in `[0, 1]`) to RGB.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    if s == 0.0 {
        return [v, v, v];
    }
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u8 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Color of the `index`-th generated group, spreading hues by the golden ratio.
pub fn group_color(index: u32) -> Rgb {
    hsv_to_rgb((index as f64 * GOLDEN_RATIO_HUE) % 1.0, 0.7, 0.9)
}

/// Format as `#rrggbb`, truncating each channel.
pub fn to_hex(color: Rgb) -> String {
    let [r, g, b] = color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Parse `#rrggbb`. Returns `None` for anything else.
pub fn from_hex(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() < 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|c| c as f64 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}
