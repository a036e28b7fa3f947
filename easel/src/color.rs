//! A simple representation of color.

use crate::error::{invalid_arg, Error};

/// The colorspace used to interpret numeric channel values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Rgb,
    Hsb,
    Cmyk,
    Grey,
}

/// A datatype representing color.
///
/// Channels are stored internally as normalized sRGB + alpha regardless of
/// the mode the color was specified in; the mode tag records provenance
/// only. Equality is channel-wise and ignores the tag, so
/// `Color::new(Rgb, &[255.0, 0.0, 0.0], 255.0)` equals
/// `Color::new(Rgb, &[1.0, 0.0, 0.0], 1.0)`.
#[derive(Clone, Copy, Debug)]
pub struct Color {
    mode: ColorMode,
    rgba: [f64; 4],
}

impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        self.rgba == other.rgba
    }
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color {
        mode: ColorMode::Grey,
        rgba: [0.0, 0.0, 0.0, 1.0],
    };

    /// Opaque white.
    pub const WHITE: Color = Color {
        mode: ColorMode::Grey,
        rgba: [1.0, 1.0, 1.0, 1.0],
    };

    /// Fully transparent black.
    pub const CLEAR: Color = Color {
        mode: ColorMode::Grey,
        rgba: [0.0, 0.0, 0.0, 0.0],
    };

    /// Create a color from channel values interpreted in `mode`.
    ///
    /// Inputs are clamped to `[0, range]` and normalized; `range` plays no
    /// further role once the color exists. The expected channel counts are
    /// 1–2 for `Grey` (brightness + optional alpha), 3–4 for `Rgb`/`Hsb`,
    /// and 4–5 for `Cmyk`. Regardless of mode, a 1- or 2-element slice is
    /// accepted as a grey (+alpha) shorthand.
    pub fn new(mode: ColorMode, channels: &[f64], range: f64) -> Result<Color, Error> {
        if range <= 0.0 {
            return Err(invalid_arg(format!(
                "color: range must be positive (got {range})"
            )));
        }
        let norm = |v: f64| v.clamp(0.0, range) / range;

        let (rgba, mode) = match (mode, channels) {
            (_, []) => ([0.0, 0.0, 0.0, 1.0], ColorMode::Grey),
            (_, [v]) => (grey_to_rgb(norm(*v), 1.0), ColorMode::Grey),
            (_, [v, a]) => (grey_to_rgb(norm(*v), norm(*a)), ColorMode::Grey),
            (ColorMode::Rgb, [r, g, b]) => ([norm(*r), norm(*g), norm(*b), 1.0], mode),
            (ColorMode::Rgb, [r, g, b, a]) => ([norm(*r), norm(*g), norm(*b), norm(*a)], mode),
            (ColorMode::Hsb, [h, s, b]) => (hsb_to_rgb(norm(*h), norm(*s), norm(*b), 1.0), mode),
            (ColorMode::Hsb, [h, s, b, a]) => {
                (hsb_to_rgb(norm(*h), norm(*s), norm(*b), norm(*a)), mode)
            }
            (ColorMode::Cmyk, [c, m, y, k]) => {
                (cmyk_to_rgb(norm(*c), norm(*m), norm(*y), norm(*k), 1.0), mode)
            }
            (ColorMode::Cmyk, [c, m, y, k, a]) => (
                cmyk_to_rgb(norm(*c), norm(*m), norm(*y), norm(*k), norm(*a)),
                mode,
            ),
            _ => {
                return Err(invalid_arg(format!(
                    "color: wrong number of channels for {:?} (got {})",
                    mode,
                    channels.len()
                )))
            }
        };
        Ok(Color { mode, rgba })
    }

    /// Create an opaque grey with channels in the range 0.0 to 1.0.
    pub fn grey(v: f64) -> Color {
        Color {
            mode: ColorMode::Grey,
            rgba: grey_to_rgb(v.clamp(0.0, 1.0), 1.0),
        }
    }

    /// Create an opaque color from r/g/b values in the range 0.0 to 1.0.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color::rgba(r, g, b, 1.0)
    }

    /// Create a color from r/g/b/a values in the range 0.0 to 1.0.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color {
            mode: ColorMode::Rgb,
            rgba: [
                r.clamp(0.0, 1.0),
                g.clamp(0.0, 1.0),
                b.clamp(0.0, 1.0),
                a.clamp(0.0, 1.0),
            ],
        }
    }

    /// Parse a color from a hex string or a CSS color name.
    ///
    /// Hex strings begin with `#` and carry 3, 4, 6, or 8 digits.
    pub fn parse(spec: &str) -> Result<Color, Error> {
        if let Some(digits) = spec.strip_prefix('#') {
            return Color::from_hex(digits);
        }
        named_color(spec)
            .ok_or_else(|| invalid_arg(format!("color: unrecognized color name {spec:?}")))
    }

    fn from_hex(digits: &str) -> Result<Color, Error> {
        let err = || invalid_arg(format!("color: malformed hex string \"#{digits}\""));
        let nibble = |c: char| c.to_digit(16).map(|d| d as f64);
        let chars: Vec<f64> = digits.chars().map(nibble).collect::<Option<_>>().ok_or_else(err)?;
        let rgba = match chars.as_slice() {
            [r, g, b] => [r / 15.0, g / 15.0, b / 15.0, 1.0],
            [r, g, b, a] => [r / 15.0, g / 15.0, b / 15.0, a / 15.0],
            [r1, r0, g1, g0, b1, b0] => [
                (r1 * 16.0 + r0) / 255.0,
                (g1 * 16.0 + g0) / 255.0,
                (b1 * 16.0 + b0) / 255.0,
                1.0,
            ],
            [r1, r0, g1, g0, b1, b0, a1, a0] => [
                (r1 * 16.0 + r0) / 255.0,
                (g1 * 16.0 + g0) / 255.0,
                (b1 * 16.0 + b0) / 255.0,
                (a1 * 16.0 + a0) / 255.0,
            ],
            _ => return Err(err()),
        };
        Ok(Color {
            mode: ColorMode::Rgb,
            rgba,
        })
    }

    /// Derive a color with just the alpha replaced.
    pub fn with_alpha(self, a: f64) -> Color {
        let mut rgba = self.rgba;
        rgba[3] = a.clamp(0.0, 1.0);
        Color { rgba, ..self }
    }

    /// The colorspace this color was specified in.
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// The normalized r/g/b/a components.
    pub fn components(&self) -> [f64; 4] {
        self.rgba
    }

    pub fn red(&self) -> f64 {
        self.rgba[0]
    }

    pub fn green(&self) -> f64 {
        self.rgba[1]
    }

    pub fn blue(&self) -> f64 {
        self.rgba[2]
    }

    pub fn alpha(&self) -> f64 {
        self.rgba[3]
    }

    /// Convert to 8-bit r/g/b/a components.
    pub fn as_rgba8(&self) -> [u8; 4] {
        let quant = |v: f64| (v * 255.0).round() as u8;
        [
            quant(self.rgba[0]),
            quant(self.rgba[1]),
            quant(self.rgba[2]),
            quant(self.rgba[3]),
        ]
    }
}

impl Default for Color {
    fn default() -> Color {
        Color::BLACK
    }
}

fn grey_to_rgb(v: f64, a: f64) -> [f64; 4] {
    [v, v, v, a]
}

// Standard hexcone conversion, with hue wrapped into [0,1).
fn hsb_to_rgb(h: f64, s: f64, b: f64, a: f64) -> [f64; 4] {
    if s == 0.0 {
        return [b, b, b, a];
    }
    let h = (h.fract() + 1.0).fract() * 6.0;
    let i = h.floor();
    let f = h - i;
    let p = b * (1.0 - s);
    let q = b * (1.0 - s * f);
    let t = b * (1.0 - s * (1.0 - f));
    let (r, g, bl) = match i as u32 {
        0 => (b, t, p),
        1 => (q, b, p),
        2 => (p, b, t),
        3 => (p, q, b),
        4 => (t, p, b),
        _ => (b, p, q),
    };
    [r, g, bl, a]
}

fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64, a: f64) -> [f64; 4] {
    [
        (1.0 - c) * (1.0 - k),
        (1.0 - m) * (1.0 - k),
        (1.0 - y) * (1.0 - k),
        a,
    ]
}

/// A selection of the CSS named colors.
fn named_color(name: &str) -> Option<Color> {
    let rgb24 = |hex: u32| Color {
        mode: ColorMode::Rgb,
        rgba: [
            ((hex >> 16) & 0xff) as f64 / 255.0,
            ((hex >> 8) & 0xff) as f64 / 255.0,
            (hex & 0xff) as f64 / 255.0,
            1.0,
        ],
    };
    let hex = match name.to_ascii_lowercase().as_str() {
        "black" => 0x000000,
        "silver" => 0xc0c0c0,
        "gray" | "grey" => 0x808080,
        "white" => 0xffffff,
        "maroon" => 0x800000,
        "red" => 0xff0000,
        "purple" => 0x800080,
        "fuchsia" | "magenta" => 0xff00ff,
        "green" => 0x008000,
        "lime" => 0x00ff00,
        "olive" => 0x808000,
        "yellow" => 0xffff00,
        "navy" => 0x000080,
        "blue" => 0x0000ff,
        "teal" => 0x008080,
        "aqua" | "cyan" => 0x00ffff,
        "orange" => 0xffa500,
        "brown" => 0xa52a2a,
        "chartreuse" => 0x7fff00,
        "coral" => 0xff7f50,
        "crimson" => 0xdc143c,
        "gold" => 0xffd700,
        "indigo" => 0x4b0082,
        "ivory" => 0xfffff0,
        "khaki" => 0xf0e68c,
        "lavender" => 0xe6e6fa,
        "orchid" => 0xda70d6,
        "pink" => 0xffc0cb,
        "plum" => 0xdda0dd,
        "salmon" => 0xfa8072,
        "sienna" => 0xa0522d,
        "skyblue" => 0x87ceeb,
        "slategray" | "slategrey" => 0x708090,
        "tan" => 0xd2b48c,
        "tomato" => 0xff6347,
        "turquoise" => 0x40e0d0,
        "violet" => 0xee82ee,
        "wheat" => 0xf5deb3,
        _ => return None,
    };
    Some(rgb24(hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_normalize_to_equal_channels() {
        let unit = Color::new(ColorMode::Rgb, &[1.0, 0.0, 0.0], 1.0).unwrap();
        let bytes = Color::new(ColorMode::Rgb, &[255.0, 0.0, 0.0], 255.0).unwrap();
        let percent = Color::new(ColorMode::Rgb, &[100.0, 0.0, 0.0], 100.0).unwrap();
        assert_eq!(unit, bytes);
        assert_eq!(unit, percent);
    }

    #[test]
    fn channels_clamp_to_range() {
        let c = Color::new(ColorMode::Rgb, &[300.0, -20.0, 128.0], 255.0).unwrap();
        assert_eq!(c.red(), 1.0);
        assert_eq!(c.green(), 0.0);
        assert!((c.blue() - 128.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn grey_shorthand_applies_in_any_mode() {
        let a = Color::new(ColorMode::Cmyk, &[0.5], 1.0).unwrap();
        let b = Color::new(ColorMode::Rgb, &[0.5, 0.5, 0.5], 1.0).unwrap();
        assert_eq!(a, b);
        let translucent = Color::new(ColorMode::Hsb, &[1.0, 0.75], 1.0).unwrap();
        assert_eq!(translucent.alpha(), 0.75);
    }

    #[test]
    fn hsb_and_cmyk_convert() {
        let red = Color::new(ColorMode::Hsb, &[0.0, 1.0, 1.0], 1.0).unwrap();
        assert_eq!(red.components(), [1.0, 0.0, 0.0, 1.0]);
        let blue = Color::new(ColorMode::Cmyk, &[1.0, 1.0, 0.0, 0.0], 1.0).unwrap();
        assert_eq!(blue.components(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn hex_and_names_parse() {
        assert_eq!(Color::parse("#f00").unwrap(), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(
            Color::parse("#ff0000").unwrap(),
            Color::rgb(1.0, 0.0, 0.0)
        );
        let pale = Color::parse("#ffffff80").unwrap();
        assert!((pale.alpha() - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(Color::parse("red").unwrap(), Color::rgb(1.0, 0.0, 0.0));
        assert!(Color::parse("no-such-color").is_err());
        assert!(Color::parse("#12345").is_err());
    }

    #[test]
    fn wrong_channel_counts_are_invalid() {
        assert!(Color::new(ColorMode::Rgb, &[1.0, 0.0, 0.0, 1.0, 9.0], 1.0).is_err());
        assert!(Color::new(ColorMode::Hsb, &[0.1; 5], 1.0).is_err());
    }
}
