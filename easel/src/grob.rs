//! Graphic objects: the drawable units a canvas retains.

use kurbo::{Point, Rect};

use crate::effect::Effect;
use crate::error::Error;
use crate::image::ImageData;
use crate::paint::Paint;
use crate::path::BezierPath;
use crate::pen::Pen;
use crate::render::Renderer;
use crate::transform::Transform;
use crate::typography::{Stylesheet, TextStyle};

/// An identifier for a grob within its owning context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GrobId(pub u64);

/// Whether a mask keeps the content inside or outside its path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClipStyle {
    /// Only content within the path survives.
    #[default]
    Inside,
    /// The test is inverted; only content outside the path survives.
    Outside,
}

/// The channel an image-backed mask reads its coverage from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaskChannel {
    #[default]
    Alpha,
    Black,
}

/// A path with the style it snapshotted when it was drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct PathGrob {
    pub id: GrobId,
    pub path: BezierPath,
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub pen: Pen,
    pub transform: Transform,
    pub effect: Effect,
}

/// A block of (possibly marked-up) text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextGrob {
    pub id: GrobId,
    pub text: String,
    pub origin: Point,
    /// Wrap width and block height; `None` means unconstrained.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub style: TextStyle,
    pub stylesheet: Stylesheet,
    pub fill: Option<Paint>,
    pub transform: Transform,
    pub effect: Effect,
}

/// A placed raster image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageGrob {
    pub id: GrobId,
    pub image: ImageData,
    pub origin: Point,
    /// Target size; `None` keeps the natural dimensions.
    pub size: Option<(f64, f64)>,
    pub transform: Transform,
    pub effect: Effect,
}

/// A clipping container: contents composite against the mask path.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskGrob {
    pub id: GrobId,
    pub path: BezierPath,
    pub style: ClipStyle,
    pub channel: Option<MaskChannel>,
    pub contents: Vec<Grob>,
}

/// An effect-group container: contents composite through the effect.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerGrob {
    pub id: GrobId,
    pub effect: Effect,
    pub contents: Vec<Grob>,
}

/// Any drawable or composable unit retained by a canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum Grob {
    Path(PathGrob),
    Text(TextGrob),
    Image(ImageGrob),
    Mask(MaskGrob),
    Layer(LayerGrob),
}

impl Grob {
    pub fn id(&self) -> GrobId {
        match self {
            Grob::Path(g) => g.id,
            Grob::Text(g) => g.id,
            Grob::Image(g) => g.id,
            Grob::Mask(g) => g.id,
            Grob::Layer(g) => g.id,
        }
    }

    /// Nested contents, for container variants.
    pub fn contents(&self) -> Option<&[Grob]> {
        match self {
            Grob::Mask(g) => Some(&g.contents),
            Grob::Layer(g) => Some(&g.contents),
            _ => None,
        }
    }

    pub(crate) fn contents_mut(&mut self) -> Option<&mut Vec<Grob>> {
        match self {
            Grob::Mask(g) => Some(&mut g.contents),
            Grob::Layer(g) => Some(&mut g.contents),
            _ => None,
        }
    }

    /// The untransformed bounding box.
    ///
    /// Text and image extents depend on backend measurement; their bounds
    /// cover the declared frame (or collapse to the origin without one).
    pub fn bounds(&self) -> Rect {
        match self {
            Grob::Path(g) => g.path.bounds(),
            Grob::Text(g) => frame_bounds(g.origin, g.width, g.height),
            Grob::Image(g) => {
                let size = g.size.unwrap_or((0.0, 0.0));
                frame_bounds(g.origin, Some(size.0), Some(size.1))
            }
            Grob::Mask(g) => g.path.bounds(),
            Grob::Layer(g) => g
                .contents
                .iter()
                .map(Grob::bounds)
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO),
        }
    }

    /// Replay this grob (and any nested contents) against a backend.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<(), Error> {
        match self {
            Grob::Path(g) => {
                if let Some(fill) = &g.fill {
                    renderer.fill_path(&g.path, g.transform, fill, &g.effect)?;
                }
                if let Some(stroke) = &g.stroke {
                    renderer.stroke_path(&g.path, g.transform, stroke, &g.pen, &g.effect)?;
                }
                Ok(())
            }
            Grob::Text(g) => renderer.draw_text(g),
            Grob::Image(g) => renderer.draw_image(g),
            Grob::Mask(g) => {
                renderer.push_mask(&g.path, g.style)?;
                let result = draw_all(&g.contents, renderer);
                renderer.pop_mask()?;
                result
            }
            Grob::Layer(g) => {
                renderer.push_layer(&g.effect)?;
                let result = draw_all(&g.contents, renderer);
                renderer.pop_layer()?;
                result
            }
        }
    }
}

fn draw_all<R: Renderer + ?Sized>(grobs: &[Grob], renderer: &mut R) -> Result<(), Error> {
    for grob in grobs {
        grob.draw(renderer)?;
    }
    Ok(())
}

fn frame_bounds(origin: Point, width: Option<f64>, height: Option<f64>) -> Rect {
    Rect::new(
        origin.x,
        origin.y,
        origin.x + width.unwrap_or(0.0),
        origin.y + height.unwrap_or(0.0),
    )
}
