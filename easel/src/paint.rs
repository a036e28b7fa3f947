//! Fill-like values: solid colors, gradients, and tiled patterns.

use kurbo::Point;

use crate::color::Color;
use crate::error::{invalid_arg, Error};
use crate::image::ImageData;
use crate::transform::Angle;

/// Anything that can sit in the fill (or stroke) slot of the graphics state.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    Gradient(Gradient),
    Pattern(Pattern),
}

impl Paint {
    /// The solid color, if this paint is one.
    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Paint::Solid(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Color> for Paint {
    fn from(c: Color) -> Paint {
        Paint::Solid(c)
    }
}

impl From<Gradient> for Paint {
    fn from(g: Gradient) -> Paint {
        Paint::Gradient(g)
    }
}

impl From<Pattern> for Paint {
    fn from(p: Pattern) -> Paint {
        Paint::Pattern(p)
    }
}

impl Default for Paint {
    fn default() -> Paint {
        Paint::Solid(Color::BLACK)
    }
}

/// Specification of a gradient stop.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientStop {
    /// The coordinate of the stop, in the range 0.0 to 1.0.
    pub pos: f64,
    /// The color at that stop.
    pub color: Color,
}

/// The geometric form of a gradient, relative to the bounds of the grob
/// being painted.
#[derive(Clone, Debug, PartialEq)]
pub enum GradientForm {
    /// A linear ramp along the given clockwise angle (0 points right).
    Linear { angle: Angle },
    /// A radial ramp outward from a center given in unit coordinates.
    Radial { center: Point },
}

/// A multi-stop color ramp usable anywhere a fill color is accepted.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    form: GradientForm,
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Create a linear gradient along `angle`.
    ///
    /// At least two stops are required.
    pub fn linear(angle: Angle, stops: impl GradientStops) -> Result<Gradient, Error> {
        Gradient::with_form(GradientForm::Linear { angle }, stops)
    }

    /// Create a radial gradient centered at `center` (unit coordinates,
    /// `(0.5, 0.5)` is the middle of the painted bounds).
    pub fn radial(center: impl Into<Point>, stops: impl GradientStops) -> Result<Gradient, Error> {
        Gradient::with_form(
            GradientForm::Radial {
                center: center.into(),
            },
            stops,
        )
    }

    fn with_form(form: GradientForm, stops: impl GradientStops) -> Result<Gradient, Error> {
        let stops = stops.to_vec();
        if stops.len() < 2 {
            return Err(invalid_arg(format!(
                "gradient: at least two color stops are required (got {})",
                stops.len()
            )));
        }
        Ok(Gradient { form, stops })
    }

    pub fn form(&self) -> &GradientForm {
        &self.form
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }
}

/// A tileable image used as a fill.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    image: ImageData,
}

impl Pattern {
    pub fn new(image: ImageData) -> Pattern {
        Pattern { image }
    }

    pub fn image(&self) -> &ImageData {
        &self.image
    }
}

/// A flexible, ergonomic way to describe gradient stops.
pub trait GradientStops {
    fn to_vec(self) -> Vec<GradientStop>;
}

impl GradientStops for Vec<GradientStop> {
    fn to_vec(self) -> Vec<GradientStop> {
        self
    }
}

impl GradientStops for &[GradientStop] {
    fn to_vec(self) -> Vec<GradientStop> {
        self.to_owned()
    }
}

// Generate equally-spaced stops.
impl GradientStops for &[Color] {
    fn to_vec(self) -> Vec<GradientStop> {
        if self.is_empty() {
            Vec::new()
        } else {
            let denom = (self.len() - 1).max(1) as f64;
            self.iter()
                .enumerate()
                .map(|(i, c)| GradientStop {
                    pos: (i as f64) / denom,
                    color: c.to_owned(),
                })
                .collect()
        }
    }
}

impl GradientStops for (Color, Color) {
    fn to_vec(self) -> Vec<GradientStop> {
        let stops: &[Color] = &[self.0, self.1];
        GradientStops::to_vec(stops)
    }
}

impl GradientStops for (Color, Color, Color) {
    fn to_vec(self) -> Vec<GradientStop> {
        let stops: &[Color] = &[self.0, self.1, self.2];
        GradientStops::to_vec(stops)
    }
}

impl GradientStops for (Color, Color, Color, Color) {
    fn to_vec(self) -> Vec<GradientStop> {
        let stops: &[Color] = &[self.0, self.1, self.2, self.3];
        GradientStops::to_vec(stops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_expand_to_even_stops() {
        let g = Gradient::linear(
            Angle::Degrees(90.0),
            (Color::WHITE, Color::grey(0.5), Color::BLACK),
        )
        .unwrap();
        let positions: Vec<f64> = g.stops().iter().map(|s| s.pos).collect();
        assert_eq!(positions, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn single_stop_is_rejected() {
        let single: &[Color] = &[Color::BLACK];
        assert!(Gradient::linear(Angle::Degrees(0.0), single).is_err());
    }
}
