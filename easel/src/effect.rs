//! Compositing effects: alpha, blend modes, and drop shadows.

use std::str::FromStr;

use kurbo::Vec2;

use crate::color::Color;
use crate::error::{invalid_arg, Error};

/// A compositing blend mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    SoftLight,
    HardLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl FromStr for BlendMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<BlendMode, Error> {
        let mode = match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "normal" => BlendMode::Normal,
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            "overlay" => BlendMode::Overlay,
            "darken" => BlendMode::Darken,
            "lighten" => BlendMode::Lighten,
            "colordodge" => BlendMode::ColorDodge,
            "colorburn" => BlendMode::ColorBurn,
            "softlight" => BlendMode::SoftLight,
            "hardlight" => BlendMode::HardLight,
            "difference" => BlendMode::Difference,
            "exclusion" => BlendMode::Exclusion,
            "hue" => BlendMode::Hue,
            "saturation" => BlendMode::Saturation,
            "color" => BlendMode::Color,
            "luminosity" => BlendMode::Luminosity,
            _ => return Err(invalid_arg(format!("blend: unknown blend mode {s:?}"))),
        };
        Ok(mode)
    }
}

/// A drop shadow.
#[derive(Clone, Debug, PartialEq)]
pub struct Shadow {
    pub offset: Vec2,
    pub blur: f64,
    pub color: Color,
}

impl Shadow {
    pub fn new(offset: impl Into<Vec2>, blur: f64, color: Color) -> Shadow {
        Shadow {
            offset: offset.into(),
            blur,
            color,
        }
    }
}

impl Default for Shadow {
    fn default() -> Shadow {
        Shadow {
            offset: Vec2::new(6.0, 6.0),
            blur: 10.0,
            color: Color::BLACK.with_alpha(0.75),
        }
    }
}

/// A set of compositing adjustments.
///
/// Every channel is optional; `None` means "inherit from the enclosing
/// layer". Effects combine with [`merged_over`](Effect::merged_over), a
/// rightmost-override merge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Effect {
    pub alpha: Option<f64>,
    pub blend: Option<BlendMode>,
    pub shadow: Option<Shadow>,
}

impl Effect {
    /// The all-inherit (identity) effect.
    pub fn new() -> Effect {
        Effect::default()
    }

    /// Whether every channel is unset.
    pub fn is_identity(&self) -> bool {
        self.alpha.is_none() && self.blend.is_none() && self.shadow.is_none()
    }

    /// Combine with `base`, keeping `base`'s channels wherever this effect
    /// leaves them unset.
    pub fn merged_over(&self, base: &Effect) -> Effect {
        Effect {
            alpha: self.alpha.or(base.alpha),
            blend: self.blend.or(base.blend),
            shadow: self.shadow.clone().or_else(|| base.shadow.clone()),
        }
    }

    /// Derive an effect with the alpha channel replaced.
    ///
    /// Full opacity is stored as "unset" so it composes as inherit.
    pub fn with_alpha(mut self, alpha: f64) -> Effect {
        self.alpha = (alpha < 1.0).then(|| alpha.max(0.0));
        self
    }

    /// Derive an effect with the blend mode replaced.
    ///
    /// `Normal` is stored as "unset" so it composes as inherit.
    pub fn with_blend(mut self, blend: BlendMode) -> Effect {
        self.blend = (blend != BlendMode::Normal).then_some(blend);
        self
    }

    /// Derive an effect with the shadow replaced (or cleared).
    pub fn with_shadow(mut self, shadow: impl Into<Option<Shadow>>) -> Effect {
        self.shadow = shadow.into();
        self
    }
}
