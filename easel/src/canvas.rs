//! The retained scene graph and its container stack.

use std::path::Path;

use kurbo::Size;

use crate::error::{invalid_arg, new_error, Error, ErrorKind};
use crate::grob::{Grob, GrobId, LayerGrob, MaskGrob};
use crate::paint::Paint;
use crate::path::BezierPath;
use crate::render::Renderer;

/// Default canvas width, in canvas units.
pub const DEFAULT_WIDTH: f64 = 512.0;

/// Default canvas height, in canvas units.
pub const DEFAULT_HEIGHT: f64 = 512.0;

/// An export file format, selected by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Eps,
    Tiff,
    Gif,
    Jpeg,
    Png,
}

impl ExportFormat {
    /// Resolve a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Result<ExportFormat, Error> {
        let format = match ext.to_ascii_lowercase().as_str() {
            "pdf" => ExportFormat::Pdf,
            "eps" => ExportFormat::Eps,
            "tiff" => ExportFormat::Tiff,
            "gif" => ExportFormat::Gif,
            "jpg" | "jpeg" => ExportFormat::Jpeg,
            "png" => ExportFormat::Png,
            _ => {
                return Err(invalid_arg(format!(
                    "export: filename should end in .pdf, .eps, .tiff, .gif, .jpg or .png (not .{ext})"
                )))
            }
        };
        Ok(format)
    }

    /// Whether this is a vector-document format rather than a bitmap one.
    pub fn is_vector(self) -> bool {
        matches!(self, ExportFormat::Pdf | ExportFormat::Eps)
    }
}

/// A container grob still under construction on the canvas stack.
#[derive(Clone, Debug, PartialEq)]
pub enum Container {
    Mask(MaskGrob),
    Layer(LayerGrob),
}

impl Container {
    fn contents_mut(&mut self) -> &mut Vec<Grob> {
        match self {
            Container::Mask(g) => &mut g.contents,
            Container::Layer(g) => &mut g.contents,
        }
    }

    fn seal(self) -> Grob {
        match self {
            Container::Mask(g) => Grob::Mask(g),
            Container::Layer(g) => Grob::Layer(g),
        }
    }
}

/// An ordered, nestable collection of grobs plus the state needed to draw
/// and export them.
///
/// The container stack redirects where appended grobs land: while a mask or
/// layer is open, everything drawn goes into it rather than the root list.
/// The canvas is `Clone`, so an immutable snapshot can be handed to an
/// export worker while the live canvas keeps accumulating.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: f64,
    height: f64,
    /// Painted before all grobs on each draw; `None` leaves the surface
    /// untouched.
    pub background: Option<Paint>,
    grobs: Vec<Grob>,
    stack: Vec<Container>,
}

impl Canvas {
    pub fn new() -> Canvas {
        Canvas::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_size(width: f64, height: f64) -> Canvas {
        Canvas {
            width,
            height,
            background: Some(Paint::Solid(crate::color::Color::WHITE)),
            grobs: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// The number of top-level grobs.
    pub fn len(&self) -> usize {
        self.grobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grobs.is_empty()
    }

    /// Iterate over the top-level grobs in insertion (= render) order.
    pub fn iter(&self) -> std::slice::Iter<'_, Grob> {
        self.grobs.iter()
    }

    /// How many containers are currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Add a grob at the current insertion point: the innermost open
    /// container, or the root list when none is open.
    pub fn append(&mut self, grob: Grob) {
        match self.stack.last_mut() {
            Some(container) => container.contents_mut().push(grob),
            None => self.grobs.push(grob),
        }
    }

    /// Open a container; subsequent appends land inside it until the
    /// matching [`pop`](Canvas::pop).
    pub fn push(&mut self, container: Container) {
        self.stack.push(container);
    }

    /// Close the innermost container, sealing it into its parent at the
    /// point where it was pushed.
    pub fn pop(&mut self) -> Result<(), Error> {
        let container = self
            .stack
            .pop()
            .ok_or_else(|| new_error(ErrorKind::StackUnderflow("pop: too many canvas pops")))?;
        self.append(container.seal());
        Ok(())
    }

    /// Drop every grob and reset the container stack to the root.
    pub fn clear(&mut self) {
        self.grobs.clear();
        self.stack.clear();
    }

    /// Remove a grob wherever it is nested. Returns whether it was found.
    pub fn remove(&mut self, id: GrobId) -> bool {
        fn drop_from(grobs: &mut Vec<Grob>, id: GrobId) -> bool {
            if let Some(ix) = grobs.iter().position(|g| g.id() == id) {
                grobs.remove(ix);
                return true;
            }
            grobs
                .iter_mut()
                .filter_map(Grob::contents_mut)
                .any(|contents| drop_from(contents, id))
        }
        let mut found = drop_from(&mut self.grobs, id);
        for container in &mut self.stack {
            if found {
                break;
            }
            found = drop_from(container.contents_mut(), id);
        }
        found
    }

    /// Remove every already-plotted path grob whose geometry equals `path`.
    ///
    /// Used when a path becomes a clipping mask: any stray earlier plot of
    /// it must not composite under the masked region.
    pub fn remove_path(&mut self, path: &BezierPath) -> usize {
        fn drop_from(grobs: &mut Vec<Grob>, path: &BezierPath) -> usize {
            let before = grobs.len();
            grobs.retain(|g| !matches!(g, Grob::Path(p) if &p.path == path));
            let mut dropped = before - grobs.len();
            for contents in grobs.iter_mut().filter_map(Grob::contents_mut) {
                dropped += drop_from(contents, path);
            }
            dropped
        }
        let mut dropped = drop_from(&mut self.grobs, path);
        for container in &mut self.stack {
            dropped += drop_from(container.contents_mut(), path);
        }
        dropped
    }

    /// Replay the scene against a backend: background first, then every
    /// grob in insertion order. Open containers are not drawn.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<(), Error> {
        if let Some(background) = &self.background {
            renderer.clear(background)?;
        }
        for grob in &self.grobs {
            grob.draw(renderer)?;
        }
        Ok(())
    }

    /// Encode the canvas to bytes in the given format.
    pub fn export<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        format: ExportFormat,
    ) -> Result<Vec<u8>, Error> {
        renderer.encode(self, format)
    }

    /// Write the canvas to an image file, picking the format from the
    /// file extension.
    pub fn save_file<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        path: impl AsRef<Path>,
    ) -> Result<(), Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| invalid_arg(format!("export: no file extension in {path:?}")))?;
        let bytes = self.export(renderer, ExportFormat::from_extension(ext)?)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Canvas {
        Canvas::new()
    }
}
