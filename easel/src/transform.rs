//! The accumulated transformation matrix and its origin-point semantics.

use std::f64::consts::TAU;

use kurbo::{Affine, Point, Rect};

/// How the accumulated transform is anchored when a grob is drawn.
///
/// With `Center` (the default), rotation and scaling pivot around the
/// centermost point of the object being drawn, so they don't also move it.
/// With `Corner` the transform applies relative to the canvas origin and
/// thus to the object's upper-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransformMode {
    Corner,
    #[default]
    Center,
}

/// The unit used when a rotation is given as a bare number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RotationUnit {
    #[default]
    Degrees,
    Radians,
    /// Fractions of a full turn; `1.0` is 360°.
    Percent,
}

/// A rotation amount tagged with its unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Angle {
    Degrees(f64),
    Radians(f64),
    /// A fraction of a full turn.
    Percent(f64),
}

impl Angle {
    /// Build an `Angle` from a bare value and a unit mode.
    pub fn with_unit(unit: RotationUnit, value: f64) -> Angle {
        match unit {
            RotationUnit::Degrees => Angle::Degrees(value),
            RotationUnit::Radians => Angle::Radians(value),
            RotationUnit::Percent => Angle::Percent(value),
        }
    }

    /// The angle in radians.
    pub fn to_radians(self) -> f64 {
        match self {
            Angle::Degrees(d) => d.to_radians(),
            Angle::Radians(r) => r,
            Angle::Percent(p) => p * TAU,
        }
    }
}

/// A 2D affine transform.
///
/// A thin wrapper around [`kurbo::Affine`] whose mutators compose each new
/// operation *before* the accumulated matrix, so that later calls apply
/// closer to the object being drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    affine: Affine,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform {
        affine: Affine::IDENTITY,
    };

    pub fn new(affine: Affine) -> Transform {
        Transform { affine }
    }

    /// The underlying matrix.
    pub fn affine(&self) -> Affine {
        self.affine
    }

    /// Shift subsequent drawing by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.affine *= Affine::translate((dx, dy));
    }

    /// Rotate subsequent drawing clockwise by `angle`.
    pub fn rotate(&mut self, angle: Angle) {
        // Negated so that positive angles read as clockwise on a y-down canvas.
        self.affine *= Affine::rotate(-angle.to_radians());
    }

    /// Scale subsequent drawing; with `sy` of `None` the x factor applies to
    /// both axes.
    pub fn scale(&mut self, sx: f64, sy: impl Into<Option<f64>>) {
        let sy = sy.into().unwrap_or(sx);
        self.affine *= Affine::scale_non_uniform(sx, sy);
    }

    /// Skew subsequent drawing by per-axis angles, in degrees.
    pub fn skew(&mut self, kx: f64, ky: f64) {
        let (tx, ty) = (kx.to_radians().tan(), ky.to_radians().tan());
        self.affine *= Affine::new([1.0, ty, tx, 1.0, 0.0, 0.0]);
    }

    /// Compose `other` before the accumulated matrix.
    pub fn prepend(&mut self, other: Transform) {
        self.affine *= other.affine;
    }

    /// The inverse transform.
    pub fn inverse(&self) -> Transform {
        Transform {
            affine: self.affine.inverse(),
        }
    }

    /// Apply the transform to a point.
    pub fn apply(&self, p: Point) -> Point {
        self.affine * p
    }

    /// Resolve the transform for an object with the given bounds.
    ///
    /// In `Center` mode the matrix is conjugated with a translation to the
    /// bounds' center, so rotation and scaling pivot around the object
    /// rather than the canvas origin.
    pub fn relative_to(&self, mode: TransformMode, bounds: Rect) -> Transform {
        match mode {
            TransformMode::Corner => *self,
            TransformMode::Center => {
                let nudge = bounds.center().to_vec2();
                Transform {
                    affine: Affine::translate(nudge) * self.affine * Affine::translate(-nudge),
                }
            }
        }
    }

    /// Whether the matrices agree within `tolerance`, coefficient-wise.
    pub fn approx_eq(&self, other: &Transform, tolerance: f64) -> bool {
        self.affine
            .as_coeffs()
            .iter()
            .zip(other.affine.as_coeffs().iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::IDENTITY
    }
}

impl From<Affine> for Transform {
    fn from(affine: Affine) -> Transform {
        Transform { affine }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn composed() -> Transform {
        let mut t = Transform::IDENTITY;
        t.translate(10.0, -4.5);
        t.rotate(Angle::Degrees(30.0));
        t.scale(2.0, 0.5);
        t.skew(15.0, 0.0);
        t
    }

    #[test]
    fn inverse_roundtrip_is_identity() {
        for t in [
            {
                let mut t = Transform::IDENTITY;
                t.translate(3.0, 7.0);
                t
            },
            {
                let mut t = Transform::IDENTITY;
                t.rotate(Angle::Radians(1.1));
                t
            },
            {
                let mut t = Transform::IDENTITY;
                t.scale(3.5, None);
                t
            },
            {
                let mut t = Transform::IDENTITY;
                t.skew(25.0, -10.0);
                t
            },
            composed(),
        ] {
            let mut round = t;
            round.prepend(t.inverse());
            assert!(round.approx_eq(&Transform::IDENTITY, EPS), "{round:?}");
        }
    }

    #[test]
    fn angle_units_agree() {
        let quarter = [
            Angle::Degrees(90.0),
            Angle::Radians(std::f64::consts::FRAC_PI_2),
            Angle::Percent(0.25),
        ];
        for angle in quarter {
            assert!((angle.to_radians() - std::f64::consts::FRAC_PI_2).abs() < EPS);
        }
    }

    #[test]
    fn later_calls_apply_closer_to_the_object() {
        // translate-then-scale must scale the point first, then shift it.
        let mut t = Transform::IDENTITY;
        t.translate(100.0, 0.0);
        t.scale(2.0, None);
        let p = t.apply(Point::new(1.0, 1.0));
        assert!((p.x - 102.0).abs() < EPS);
        assert!((p.y - 2.0).abs() < EPS);
    }

    #[test]
    fn center_mode_pivots_on_bounds() {
        let mut t = Transform::IDENTITY;
        t.scale(2.0, None);
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let resolved = t.relative_to(TransformMode::Center, bounds);
        // The center of the bounds stays put.
        let c = resolved.apply(Point::new(5.0, 5.0));
        assert!((c.x - 5.0).abs() < EPS && (c.y - 5.0).abs() < EPS);
        // A corner moves away from the center.
        let corner = resolved.apply(Point::new(0.0, 0.0));
        assert!((corner.x + 5.0).abs() < EPS && (corner.y + 5.0).abs() < EPS);
    }
}
