//! The outbound boundary: what a rendering backend must provide.

use kurbo::Size;

use crate::canvas::{Canvas, ExportFormat};
use crate::effect::Effect;
use crate::error::Error;
use crate::grob::{ClipStyle, ImageGrob, TextGrob};
use crate::image::ImageData;
use crate::paint::Paint;
use crate::path::BezierPath;
use crate::pen::Pen;
use crate::transform::Transform;

/// A rendering backend.
///
/// The core hands every drawing call the grob's snapshotted style and
/// resolved transform; the backend owns rasterization, font shaping,
/// image decoding, and export encoding. Mask and layer pushes always
/// arrive balanced with their pops.
pub trait Renderer {
    /// Paint the whole surface with `paint` (the canvas background).
    fn clear(&mut self, paint: &Paint) -> Result<(), Error>;

    /// Fill a path.
    fn fill_path(
        &mut self,
        path: &BezierPath,
        transform: Transform,
        paint: &Paint,
        effect: &Effect,
    ) -> Result<(), Error>;

    /// Stroke a path.
    fn stroke_path(
        &mut self,
        path: &BezierPath,
        transform: Transform,
        paint: &Paint,
        pen: &Pen,
        effect: &Effect,
    ) -> Result<(), Error>;

    /// Lay out and draw a text block.
    fn draw_text(&mut self, text: &TextGrob) -> Result<(), Error>;

    /// Measure a text block without drawing it, in canvas units.
    fn measure_text(&mut self, text: &TextGrob) -> Result<Size, Error>;

    /// Draw a raster image.
    fn draw_image(&mut self, image: &ImageGrob) -> Result<(), Error>;

    /// The natural pixel dimensions of encoded image data.
    fn image_size(&mut self, image: &ImageData) -> Result<Size, Error>;

    /// Begin clipping subsequent drawing to a path.
    fn push_mask(&mut self, path: &BezierPath, style: ClipStyle) -> Result<(), Error>;

    /// End the innermost clip.
    fn pop_mask(&mut self) -> Result<(), Error>;

    /// Begin compositing subsequent drawing through an effect.
    fn push_layer(&mut self, effect: &Effect) -> Result<(), Error>;

    /// End the innermost layer.
    fn pop_layer(&mut self) -> Result<(), Error>;

    /// Encode a canvas to bytes in the given format.
    ///
    /// The canvas is an immutable snapshot; implementations replay it with
    /// [`Canvas::draw`] against whatever surface the format requires.
    fn encode(&mut self, canvas: &Canvas, format: ExportFormat) -> Result<Vec<u8>, Error>;
}

/// A renderer that doesn't render.
///
/// Useful for measuring the cost of the scene-graph machinery and for doc
/// tests, but made public in case it might come in handy.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl NullRenderer {
    pub fn new() -> NullRenderer {
        NullRenderer
    }
}

impl Renderer for NullRenderer {
    fn clear(&mut self, _paint: &Paint) -> Result<(), Error> {
        Ok(())
    }

    fn fill_path(
        &mut self,
        _path: &BezierPath,
        _transform: Transform,
        _paint: &Paint,
        _effect: &Effect,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn stroke_path(
        &mut self,
        _path: &BezierPath,
        _transform: Transform,
        _paint: &Paint,
        _pen: &Pen,
        _effect: &Effect,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn draw_text(&mut self, _text: &TextGrob) -> Result<(), Error> {
        Ok(())
    }

    fn measure_text(&mut self, text: &TextGrob) -> Result<Size, Error> {
        // A crude fixed-pitch estimate so measurements are at least stable.
        let size = text.style.size;
        let longest = text
            .text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let lines = text.text.lines().count().max(1);
        Ok(Size::new(
            longest as f64 * size * 0.6,
            lines as f64 * size * text.style.line_height,
        ))
    }

    fn draw_image(&mut self, _image: &ImageGrob) -> Result<(), Error> {
        Ok(())
    }

    fn image_size(&mut self, _image: &ImageData) -> Result<Size, Error> {
        Ok(Size::ZERO)
    }

    fn push_mask(&mut self, _path: &BezierPath, _style: ClipStyle) -> Result<(), Error> {
        Ok(())
    }

    fn pop_mask(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn push_layer(&mut self, _effect: &Effect) -> Result<(), Error> {
        Ok(())
    }

    fn pop_layer(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn encode(&mut self, canvas: &Canvas, _format: ExportFormat) -> Result<Vec<u8>, Error> {
        canvas.draw(self)?;
        Ok(Vec::new())
    }
}
