//! Color scales and palettes

use plotters::style::RGBColor;

/// Qualitative palette for categorical groups.
pub const SET2: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

/// Line colors for overlaid curves.
pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub const STEEL_BLUE: RGBColor = RGBColor(31, 119, 180);

const VIRIDIS: [RGBColor; 9] = [
    RGBColor(68, 1, 84),
    RGBColor(71, 45, 123),
    RGBColor(59, 82, 139),
    RGBColor(44, 114, 142),
    RGBColor(33, 145, 140),
    RGBColor(39, 173, 129),
    RGBColor(92, 200, 99),
    RGBColor(170, 220, 50),
    RGBColor(253, 231, 37),
];

// Reversed red-blue diverging scale: blue for low, red for high.
const RED_BLUE: [RGBColor; 9] = [
    RGBColor(5, 48, 97),
    RGBColor(33, 102, 172),
    RGBColor(67, 147, 195),
    RGBColor(146, 197, 222),
    RGBColor(247, 247, 247),
    RGBColor(244, 165, 130),
    RGBColor(214, 96, 77),
    RGBColor(178, 24, 43),
    RGBColor(103, 0, 31),
];

/// Sequential scale from dark purple (0) to yellow (1).
#[must_use]
pub fn viridis(t: f64) -> RGBColor {
    interpolate(&VIRIDIS, t)
}

/// Diverging scale from blue (0) through white (0.5) to red (1).
#[must_use]
pub fn red_blue(t: f64) -> RGBColor {
    interpolate(&RED_BLUE, t)
}

/// Position of `value` within `min..=max`, clamped to `[0, 1]`.
#[must_use]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max - min <= f64::EPSILON {
        return 0.5;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Black or white, whichever reads better on `background`.
#[must_use]
pub fn contrasting_text(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luminance = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    if luminance > 140.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn interpolate(stops: &[RGBColor], t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (stops.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - lower as f64;
    let (RGBColor(r0, g0, b0), RGBColor(r1, g1, b1)) = (stops[lower], stops[lower + 1]);
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}
