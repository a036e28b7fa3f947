//! Options for stroking paths.

/// The minimum stroke width; narrower nibs are clamped up to this.
pub const MIN_NIB: f64 = 1e-4;

/// Options for the cap of stroked lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Options for angled joins in strokes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// The line style used when stroking a path.
#[derive(Clone, Debug, PartialEq)]
pub struct Pen {
    nib: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    /// On-off intervals for dashed strokes, in canvas units.
    pub dash: Option<Vec<f64>>,
}

impl Pen {
    pub fn new() -> Pen {
        Pen {
            nib: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            dash: None,
        }
    }

    /// The stroke width.
    pub fn nib(&self) -> f64 {
        self.nib
    }

    /// Set the stroke width, clamped to [`MIN_NIB`].
    pub fn set_nib(&mut self, nib: f64) {
        self.nib = nib.max(MIN_NIB);
    }

    pub fn with_nib(mut self, nib: f64) -> Pen {
        self.set_nib(nib);
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Pen {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Pen {
        self.join = join;
        self
    }

    pub fn with_dash(mut self, dash: impl Into<Option<Vec<f64>>>) -> Pen {
        self.dash = dash.into();
        self
    }
}

impl Default for Pen {
    fn default() -> Pen {
        Pen::new()
    }
}
