//! The drawing state machine: the business end of the user-facing API.
//!
//! A [`Context`] owns a [`Canvas`] and the mutable graphics state that every
//! drawing command snapshots into the grobs it creates. There is no implicit
//! process-wide context; callers construct one and pass it around.

use kurbo::Size;

use crate::canvas::{Canvas, Container, ExportFormat};
use crate::color::{Color, ColorMode};
use crate::effect::{BlendMode, Effect, Shadow};
use crate::error::{invalid_arg, new_error, Error, ErrorKind};
use crate::grob::{ClipStyle, Grob, GrobId, ImageGrob, LayerGrob, MaskGrob, PathGrob, TextGrob};
use crate::image::ImageData;
use crate::paint::Paint;
use crate::path::{ArcSlice, ArrowStyle, BezierPath, Direction, RectCorners};
use crate::pen::{LineCap, LineJoin, Pen};
use crate::render::Renderer;
use crate::transform::{Angle, RotationUnit, Transform, TransformMode};
use crate::typography::{Stylesheet, TextAlign, TextStyle};

/// The set of state variables a grob inherits and `save`/`restore` covers.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphicsState {
    pub color_mode: ColorMode,
    pub color_range: f64,
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub pen: Pen,
    pub effect: Effect,
    pub transform: Transform,
    pub transform_mode: TransformMode,
    pub rotation_unit: RotationUnit,
    pub text_style: TextStyle,
    pub stylesheet: Stylesheet,
    /// Close the active path automatically when it is ended.
    pub autoclose: bool,
}

impl Default for GraphicsState {
    fn default() -> GraphicsState {
        GraphicsState {
            color_mode: ColorMode::Rgb,
            color_range: 1.0,
            fill: Some(Paint::Solid(Color::BLACK)),
            stroke: None,
            pen: Pen::new(),
            effect: Effect::new(),
            transform: Transform::IDENTITY,
            transform_mode: TransformMode::Center,
            rotation_unit: RotationUnit::Degrees,
            text_style: TextStyle::default(),
            stylesheet: Stylesheet::new(),
            autoclose: true,
        }
    }
}

// The bezier being built between begin_path and end_path. Only one explicit
// close takes effect per build; later close_path calls are no-ops.
#[derive(Clone, Debug)]
struct ActivePath {
    path: BezierPath,
    closed: bool,
}

/// The drawing context.
///
/// Drawing commands read the current state, snapshot the relevant parts of
/// it into a grob, and append the grob to the canvas. State mutations only
/// affect grobs created afterwards.
pub struct Context {
    canvas: Canvas,
    state: GraphicsState,
    state_stack: Vec<GraphicsState>,
    transform_stack: Vec<Transform>,
    active: Option<ActivePath>,
    autoplot: bool,
    next_id: u64,
}

impl Context {
    pub fn new() -> Context {
        Context::with_canvas(Canvas::new())
    }

    pub fn with_canvas(canvas: Canvas) -> Context {
        Context {
            canvas,
            state: GraphicsState::default(),
            state_stack: Vec::new(),
            transform_stack: Vec::new(),
            active: None,
            autoplot: true,
            next_id: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    /// The current graphics state.
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Reset every state variable to its documented default.
    ///
    /// The canvas keeps its grobs; only the drawing state is reinitialized.
    pub fn reset_state(&mut self) {
        self.state = GraphicsState::default();
        self.state_stack.clear();
        self.transform_stack.clear();
        self.active = None;
        self.autoplot = true;
    }

    fn grob_id(&mut self) -> GrobId {
        self.next_id += 1;
        GrobId(self.next_id)
    }

    // --- canvas setup ---

    pub fn size(&self) -> Size {
        self.canvas.size()
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.canvas.set_size(width, height);
    }

    pub fn background(&self) -> Option<&Paint> {
        self.canvas.background.as_ref()
    }

    pub fn set_background(&mut self, paint: impl Into<Paint>) {
        self.canvas.background = Some(paint.into());
    }

    /// Leave the surface untouched before drawing.
    pub fn no_background(&mut self) {
        self.canvas.background = None;
    }

    // --- state stack ---

    /// Push a snapshot of the full graphics state.
    pub fn save(&mut self) {
        self.state_stack.push(self.state.clone());
    }

    /// Pop back to the most recently saved state.
    pub fn restore(&mut self) -> Result<(), Error> {
        self.state = self
            .state_stack
            .pop()
            .ok_or_else(|| new_error(ErrorKind::StackUnderflow("restore: too many restore calls")))?;
        Ok(())
    }

    /// Run `f` with the state saved around it.
    ///
    /// The pre-call state is reinstated no matter how `f` exits, including
    /// through an error and through unbalanced `save` calls of its own.
    pub fn with_state<T>(
        &mut self,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let saved = self.state.clone();
        let depth = self.state_stack.len();
        let result = f(self);
        self.state_stack.truncate(depth);
        self.state = saved;
        result
    }

    /// Run `f` with the fill temporarily replaced (`None` disables it).
    pub fn with_fill<T>(
        &mut self,
        fill: impl Into<Option<Paint>>,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let saved = std::mem::replace(&mut self.state.fill, fill.into());
        let result = f(self);
        self.state.fill = saved;
        result
    }

    /// Run `f` with the stroke temporarily replaced (`None` disables it).
    pub fn with_stroke<T>(
        &mut self,
        stroke: impl Into<Option<Paint>>,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let saved = std::mem::replace(&mut self.state.stroke, stroke.into());
        let result = f(self);
        self.state.stroke = saved;
        result
    }

    /// Run `f` with the pen temporarily replaced.
    pub fn with_pen<T>(
        &mut self,
        pen: Pen,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let saved = std::mem::replace(&mut self.state.pen, pen);
        let result = f(self);
        self.state.pen = saved;
        result
    }

    /// Run `f` with the color mode (and optionally the range) replaced.
    pub fn with_color_mode<T>(
        &mut self,
        mode: ColorMode,
        range: impl Into<Option<f64>>,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let saved = (self.state.color_mode, self.state.color_range);
        self.state.color_mode = mode;
        if let Some(range) = range.into() {
            self.state.color_range = range;
        }
        let result = f(self);
        (self.state.color_mode, self.state.color_range) = saved;
        result
    }

    /// Run `f` with automatic plotting switched on or off.
    ///
    /// With autoplot off, primitive commands build and return their geometry
    /// without appending anything to the canvas.
    pub fn with_autoplot<T>(
        &mut self,
        autoplot: bool,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let saved = std::mem::replace(&mut self.autoplot, autoplot);
        let result = f(self);
        self.autoplot = saved;
        result
    }

    /// Run `f` with the transform (and optionally its mode) isolated.
    ///
    /// Transform mutations and unbalanced `push` calls inside `f` do not
    /// leak out.
    pub fn with_transform<T>(
        &mut self,
        mode: impl Into<Option<TransformMode>>,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let saved = (self.state.transform, self.state.transform_mode);
        let depth = self.transform_stack.len();
        if let Some(mode) = mode.into() {
            self.state.transform_mode = mode;
        }
        let result = f(self);
        self.transform_stack.truncate(depth);
        (self.state.transform, self.state.transform_mode) = saved;
        result
    }

    // --- transforms ---

    pub fn transform(&self) -> &Transform {
        &self.state.transform
    }

    pub fn transform_mode(&self) -> TransformMode {
        self.state.transform_mode
    }

    pub fn set_transform_mode(&mut self, mode: TransformMode) {
        self.state.transform_mode = mode;
    }

    pub fn rotation_unit(&self) -> RotationUnit {
        self.state.rotation_unit
    }

    pub fn set_rotation_unit(&mut self, unit: RotationUnit) {
        self.state.rotation_unit = unit;
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform.translate(dx, dy);
    }

    /// Scale subsequent drawing; with `sy` of `None` the factor is uniform.
    pub fn scale(&mut self, sx: f64, sy: impl Into<Option<f64>>) {
        self.state.transform.scale(sx, sy);
    }

    /// Skew subsequent drawing, in degrees; with `ky` of `None` only the
    /// x axis is skewed.
    pub fn skew(&mut self, kx: f64, ky: impl Into<Option<f64>>) {
        self.state.transform.skew(kx, ky.into().unwrap_or(0.0));
    }

    /// Rotate subsequent drawing clockwise by an explicit angle.
    pub fn rotate(&mut self, angle: Angle) {
        self.state.transform.rotate(angle);
    }

    /// Rotate by a bare value, interpreted in the current rotation unit.
    pub fn rotate_by(&mut self, value: f64) {
        let angle = Angle::with_unit(self.state.rotation_unit, value);
        self.state.transform.rotate(angle);
    }

    /// Discard the accumulated transform.
    pub fn reset_transform(&mut self) {
        self.state.transform = Transform::IDENTITY;
    }

    /// Push the current transform onto the transform stack.
    pub fn push(&mut self) {
        self.transform_stack.push(self.state.transform);
    }

    /// Pop back to the most recently pushed transform.
    pub fn pop(&mut self) -> Result<(), Error> {
        self.state.transform = self
            .transform_stack
            .pop()
            .ok_or_else(|| new_error(ErrorKind::StackUnderflow("pop: too many pops")))?;
        Ok(())
    }

    // --- color and style ---

    pub fn color_mode(&self) -> ColorMode {
        self.state.color_mode
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.state.color_mode = mode;
    }

    pub fn color_range(&self) -> f64 {
        self.state.color_range
    }

    pub fn set_color_range(&mut self, range: f64) {
        self.state.color_range = range;
    }

    /// Interpret channel values in the current color mode and range.
    pub fn color(&self, channels: &[f64]) -> Result<Color, Error> {
        Color::new(self.state.color_mode, channels, self.state.color_range)
    }

    pub fn fill(&self) -> Option<&Paint> {
        self.state.fill.as_ref()
    }

    pub fn set_fill(&mut self, paint: impl Into<Paint>) {
        self.state.fill = Some(paint.into());
    }

    pub fn no_fill(&mut self) {
        self.state.fill = None;
    }

    pub fn stroke(&self) -> Option<&Paint> {
        self.state.stroke.as_ref()
    }

    pub fn set_stroke(&mut self, paint: impl Into<Paint>) {
        self.state.stroke = Some(paint.into());
    }

    pub fn no_stroke(&mut self) {
        self.state.stroke = None;
    }

    pub fn pen(&self) -> &Pen {
        &self.state.pen
    }

    pub fn nib(&self) -> f64 {
        self.state.pen.nib()
    }

    pub fn set_nib(&mut self, nib: f64) {
        self.state.pen.set_nib(nib);
    }

    pub fn set_cap(&mut self, cap: LineCap) {
        self.state.pen.cap = cap;
    }

    pub fn set_join(&mut self, join: LineJoin) {
        self.state.pen.join = join;
    }

    pub fn set_dash(&mut self, dash: impl Into<Option<Vec<f64>>>) {
        self.state.pen.dash = dash.into();
    }

    pub fn autoclose(&self) -> bool {
        self.state.autoclose
    }

    pub fn set_autoclose(&mut self, autoclose: bool) {
        self.state.autoclose = autoclose;
    }

    pub fn autoplot(&self) -> bool {
        self.autoplot
    }

    pub fn set_autoplot(&mut self, autoplot: bool) {
        self.autoplot = autoplot;
    }

    // --- effects ---

    pub fn alpha(&self) -> f64 {
        self.state.effect.alpha.unwrap_or(1.0)
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.state.effect = self.state.effect.clone().with_alpha(alpha);
    }

    pub fn blend(&self) -> BlendMode {
        self.state.effect.blend.unwrap_or_default()
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.state.effect = self.state.effect.clone().with_blend(blend);
    }

    pub fn shadow(&self) -> Option<&Shadow> {
        self.state.effect.shadow.as_ref()
    }

    pub fn set_shadow(&mut self, shadow: impl Into<Option<Shadow>>) {
        self.state.effect = self.state.effect.clone().with_shadow(shadow.into());
    }

    pub fn no_shadow(&mut self) {
        self.state.effect.shadow = None;
    }

    /// Group everything drawn by `f` into a layer compositing through `fx`.
    ///
    /// The layer's effect is `fx` merged over the effect accumulated so far;
    /// inside `f`, the working effect starts clean so contents don't apply
    /// it twice. Both the effect and the container are restored no matter
    /// how `f` exits.
    pub fn layer<T>(
        &mut self,
        fx: Effect,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let prior = std::mem::take(&mut self.state.effect);
        let id = self.grob_id();
        self.canvas.push(Container::Layer(LayerGrob {
            id,
            effect: fx.merged_over(&prior),
            contents: Vec::new(),
        }));
        let result = f(self);
        let popped = self.canvas.pop();
        self.state.effect = prior;
        match result {
            Ok(value) => {
                popped?;
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    // --- clipping ---

    /// Clip everything drawn by `f` to `path`.
    ///
    /// Any earlier plot of the same geometry is removed from the canvas so
    /// the mask path doesn't also composite as a filled shape.
    pub fn clip<T>(
        &mut self,
        path: BezierPath,
        style: ClipStyle,
        f: impl FnOnce(&mut Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.begin_clip(path, style);
        let result = f(self);
        let popped = self.canvas.pop();
        match result {
            Ok(value) => {
                popped?;
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    /// Open a clipping mask; everything drawn until [`end_clip`] lands in it.
    ///
    /// [`end_clip`]: Context::end_clip
    pub fn begin_clip(&mut self, path: BezierPath, style: ClipStyle) -> GrobId {
        self.canvas.remove_path(&path);
        let id = self.grob_id();
        self.canvas.push(Container::Mask(MaskGrob {
            id,
            path,
            style,
            channel: None,
            contents: Vec::new(),
        }));
        id
    }

    /// Close the innermost open clipping mask.
    pub fn end_clip(&mut self) -> Result<(), Error> {
        self.canvas.pop()
    }

    // --- the active path ---

    /// Begin building a path, optionally starting a contour at `start`.
    ///
    /// Until the matching [`end_path`], primitive commands contribute their
    /// contours to this path instead of plotting grobs.
    ///
    /// [`end_path`]: Context::end_path
    pub fn begin_path(&mut self, start: impl Into<Option<(f64, f64)>>) {
        let mut path = BezierPath::new();
        if let Some((x, y)) = start.into() {
            path.move_to(x, y);
        }
        self.active = Some(ActivePath {
            path,
            closed: false,
        });
    }

    /// Whether a path is currently being built.
    pub fn has_active_path(&self) -> bool {
        self.active.is_some()
    }

    fn active_mut(&mut self) -> Result<&mut ActivePath, Error> {
        self.active
            .as_mut()
            .ok_or_else(|| new_error(ErrorKind::NoActivePath))
    }

    /// Start a new contour in the active path.
    pub fn move_to(&mut self, x: f64, y: f64) -> Result<(), Error> {
        self.active_mut()?.path.move_to(x, y);
        Ok(())
    }

    /// Add a line segment to the active path.
    pub fn line_to(&mut self, x: f64, y: f64) -> Result<(), Error> {
        self.active_mut()?.path.line_to(x, y);
        Ok(())
    }

    /// Add a cubic segment to the active path.
    pub fn curve_to(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) -> Result<(), Error> {
        self.active_mut()?.path.curve_to(x1, y1, x2, y2, x3, y3);
        Ok(())
    }

    /// Add a semicircular arc from the current point to `(x, y)`.
    pub fn arc_to(&mut self, x: f64, y: f64, direction: Direction) -> Result<(), Error> {
        self.active_mut()?.path.arc_to(x, y, direction);
        Ok(())
    }

    /// Round off the corner at `(cx, cy)` with an arc of the given radius,
    /// continuing on to `(x, y)`.
    pub fn arc_through(
        &mut self,
        cx: f64,
        cy: f64,
        x: f64,
        y: f64,
        radius: f64,
    ) -> Result<(), Error> {
        self.active_mut()?.path.arc_through(cx, cy, x, y, radius);
        Ok(())
    }

    /// Close the active path's contour. A second close is a no-op.
    pub fn close_path(&mut self) -> Result<(), Error> {
        let active = self.active_mut()?;
        if !active.closed {
            active.path.close_path();
            active.closed = true;
        }
        Ok(())
    }

    /// Finish the active path, returning its geometry.
    ///
    /// If the autoclose flag is set and the path wasn't explicitly closed,
    /// it gets closed here. With `draw` set (and autoplot on), the path is
    /// also plotted with the current style.
    pub fn end_path(&mut self, draw: bool) -> Result<BezierPath, Error> {
        let mut active = self
            .active
            .take()
            .ok_or_else(|| new_error(ErrorKind::NoActivePath))?;
        if self.state.autoclose && !active.closed && !active.path.is_empty() {
            active.path.close_path();
        }
        if draw && self.autoplot {
            self.plot(active.path.clone());
        }
        Ok(active.path)
    }

    // --- plotting ---

    // Snapshots the current style around a finished piece of geometry and
    // appends it at the canvas's insertion point.
    fn plot(&mut self, path: BezierPath) -> GrobId {
        let id = self.grob_id();
        let transform = self
            .state
            .transform
            .relative_to(self.state.transform_mode, path.bounds());
        self.canvas.append(Grob::Path(PathGrob {
            id,
            path,
            fill: self.state.fill.clone(),
            stroke: self.state.stroke.clone(),
            pen: self.state.pen.clone(),
            transform,
            effect: self.state.effect.clone(),
        }));
        id
    }

    // Routes primitive geometry: into the active path while one is open,
    // onto the canvas when autoplot is on, and nowhere otherwise.
    fn submit(&mut self, path: BezierPath) -> Option<GrobId> {
        if let Some(active) = &mut self.active {
            active.path.extend(&path);
            None
        } else if self.autoplot {
            Some(self.plot(path))
        } else {
            None
        }
    }

    /// Plot a finished path with the current style, unconditionally.
    pub fn draw_path(&mut self, path: BezierPath) -> GrobId {
        self.plot(path)
    }

    // --- primitives ---

    /// Draw a rectangle with the given corner treatment.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, corners: RectCorners) -> Option<GrobId> {
        let radius = match corners {
            RectCorners::Sharp => None,
            RectCorners::Roundness(r) => {
                let radius = w.abs().min(h.abs()) / 2.0 * r.clamp(0.0, 1.0);
                Some((radius, radius))
            }
            RectCorners::Radius(rx, ry) => Some((rx, ry)),
        };
        let mut path = BezierPath::new();
        path.rect(x, y, w, h, radius);
        self.submit(path)
    }

    /// Draw an ellipse fitted to the given rectangle, or a section of it.
    pub fn oval(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        slice: impl Into<Option<ArcSlice>>,
    ) -> Option<GrobId> {
        let mut path = BezierPath::new();
        path.oval(x, y, w, h, slice.into());
        self.submit(path)
    }

    /// Synonym for [`oval`](Context::oval).
    pub fn ellipse(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        slice: impl Into<Option<ArcSlice>>,
    ) -> Option<GrobId> {
        self.oval(x, y, w, h, slice)
    }

    /// Draw a circle (or pie-sliceable arc) centered at `(x, y)`.
    pub fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        slice: impl Into<Option<ArcSlice>>,
    ) -> Option<GrobId> {
        let mut path = BezierPath::new();
        path.arc(x, y, radius, slice.into());
        self.submit(path)
    }

    /// Draw a line segment, or a semicircular arc between the endpoints.
    pub fn line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        curve: impl Into<Option<Direction>>,
    ) -> Option<GrobId> {
        let mut path = BezierPath::new();
        path.line(x1, y1, x2, y2, curve.into());
        self.submit(path)
    }

    /// Draw a regular polygon centered at `(x, y)`.
    pub fn poly(&mut self, x: f64, y: f64, radius: f64, sides: u32) -> Result<Option<GrobId>, Error> {
        if sides < 3 {
            return Err(invalid_arg(format!(
                "poly: a polygon needs at least 3 sides (not {sides})"
            )));
        }
        let mut path = BezierPath::new();
        path.poly(x, y, radius, sides);
        Ok(self.submit(path))
    }

    /// Draw a star centered at `(x, y)`.
    ///
    /// `inner` defaults to half the outer radius.
    pub fn star(
        &mut self,
        x: f64,
        y: f64,
        points: u32,
        outer: f64,
        inner: impl Into<Option<f64>>,
    ) -> Result<Option<GrobId>, Error> {
        if points < 3 {
            return Err(invalid_arg(format!(
                "star: a star needs at least 3 points (not {points})"
            )));
        }
        let inner = inner.into().unwrap_or(outer / 2.0);
        let mut path = BezierPath::new();
        path.star(x, y, points, outer, inner);
        Ok(self.submit(path))
    }

    /// Draw an arrow pointing at `(x, y)`.
    pub fn arrow(&mut self, x: f64, y: f64, width: f64, style: ArrowStyle) -> Option<GrobId> {
        let mut path = BezierPath::new();
        path.arrow(x, y, width, style);
        self.submit(path)
    }

    /// Draw a polyline (optionally closed) through the given points.
    pub fn bezier(&mut self, points: &[(f64, f64)], close: bool) -> Option<GrobId> {
        self.submit(BezierPath::from_points(points, close))
    }

    // --- typography ---

    pub fn text_style(&self) -> &TextStyle {
        &self.state.text_style
    }

    pub fn set_font(&mut self, family: impl Into<String>, size: impl Into<Option<f64>>) {
        self.state.text_style.family = family.into();
        if let Some(size) = size.into() {
            self.state.text_style.size = size;
        }
    }

    pub fn font_size(&self) -> f64 {
        self.state.text_style.size
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.state.text_style.size = size;
    }

    /// Line height as a multiple of the point size.
    pub fn line_height(&self) -> f64 {
        self.state.text_style.line_height
    }

    pub fn set_line_height(&mut self, line_height: f64) {
        self.state.text_style.line_height = line_height;
    }

    pub fn align(&self) -> TextAlign {
        self.state.text_style.align
    }

    pub fn set_align(&mut self, align: TextAlign) {
        self.state.text_style.align = align;
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.state.stylesheet
    }

    pub fn stylesheet_mut(&mut self) -> &mut Stylesheet {
        &mut self.state.stylesheet
    }

    fn make_text(
        &mut self,
        text: String,
        x: f64,
        y: f64,
        width: Option<f64>,
        height: Option<f64>,
    ) -> TextGrob {
        let id = self.grob_id();
        let grob = TextGrob {
            id,
            text,
            origin: (x, y).into(),
            width,
            height,
            style: self.state.text_style.clone(),
            stylesheet: self.state.stylesheet.clone(),
            fill: self.state.fill.clone(),
            transform: Transform::IDENTITY,
            effect: self.state.effect.clone(),
        };
        let transform = self
            .state
            .transform
            .relative_to(self.state.transform_mode, Grob::Text(grob.clone()).bounds());
        TextGrob { transform, ..grob }
    }

    /// Draw a run of text with its baseline origin at `(x, y)`.
    pub fn text(&mut self, text: impl Into<String>, x: f64, y: f64) -> Option<GrobId> {
        self.text_block(text, x, y, None, None)
    }

    /// Draw a text block wrapped to a frame.
    pub fn text_block(
        &mut self,
        text: impl Into<String>,
        x: f64,
        y: f64,
        width: impl Into<Option<f64>>,
        height: impl Into<Option<f64>>,
    ) -> Option<GrobId> {
        let grob = self.make_text(text.into(), x, y, width.into(), height.into());
        if self.autoplot {
            let id = grob.id;
            self.canvas.append(Grob::Text(grob));
            Some(id)
        } else {
            None
        }
    }

    /// Measure a run of text in the current style without drawing it.
    pub fn text_size<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        text: impl Into<String>,
    ) -> Result<Size, Error> {
        let grob = self.make_text(text.into(), 0.0, 0.0, None, None);
        renderer.measure_text(&grob)
    }

    // --- images ---

    /// Place an image with its upper-left corner at `(x, y)`.
    ///
    /// `size` stretches the image to the given dimensions; `None` keeps its
    /// natural ones.
    pub fn image(
        &mut self,
        image: ImageData,
        x: f64,
        y: f64,
        size: impl Into<Option<(f64, f64)>>,
    ) -> Option<GrobId> {
        let id = self.grob_id();
        let grob = ImageGrob {
            id,
            image,
            origin: (x, y).into(),
            size: size.into(),
            transform: Transform::IDENTITY,
            effect: self.state.effect.clone(),
        };
        let transform = self
            .state
            .transform
            .relative_to(self.state.transform_mode, Grob::Image(grob.clone()).bounds());
        if self.autoplot {
            self.canvas.append(Grob::Image(ImageGrob { transform, ..grob }));
            Some(id)
        } else {
            None
        }
    }

    // --- output ---

    /// Drop every grob from the canvas.
    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    /// Remove a single grob wherever it is nested.
    pub fn remove(&mut self, id: GrobId) -> bool {
        self.canvas.remove(id)
    }

    /// Replay the canvas against a backend.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<(), Error> {
        self.canvas.draw(renderer)
    }

    /// Encode the canvas to bytes in the given format.
    pub fn export<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        format: ExportFormat,
    ) -> Result<Vec<u8>, Error> {
        self.canvas.export(renderer, format)
    }

    /// Write the canvas to a file, picking the format from the extension.
    pub fn save_file<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Error> {
        self.canvas.save_file(renderer, path)
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ArcRange;

    fn first_path(ctx: &Context) -> &PathGrob {
        match ctx.canvas().iter().next().unwrap() {
            Grob::Path(g) => g,
            other => panic!("expected a path grob, got {other:?}"),
        }
    }

    #[test]
    fn defaults_match_a_fresh_canvas() {
        let ctx = Context::new();
        assert_eq!(ctx.size(), Size::new(512.0, 512.0));
        assert_eq!(ctx.fill(), Some(&Paint::Solid(Color::BLACK)));
        assert_eq!(ctx.stroke(), None);
        assert_eq!(ctx.nib(), 1.0);
        assert_eq!(ctx.alpha(), 1.0);
        assert_eq!(ctx.transform_mode(), TransformMode::Center);
        assert_eq!(ctx.rotation_unit(), RotationUnit::Degrees);
        assert!(ctx.autoclose());
        assert!(ctx.autoplot());
    }

    #[test]
    fn grobs_snapshot_the_state_at_draw_time() {
        let mut ctx = Context::new();
        ctx.set_fill(Color::rgb(1.0, 0.0, 0.0));
        ctx.set_stroke(Color::BLACK);
        ctx.set_nib(4.0);
        ctx.rect(0.0, 0.0, 100.0, 100.0, RectCorners::Sharp);
        // Later mutations must not affect the plotted grob.
        ctx.set_fill(Color::rgb(0.0, 1.0, 0.0));
        ctx.set_nib(1.0);

        let grob = first_path(&ctx);
        assert_eq!(grob.fill, Some(Paint::Solid(Color::rgb(1.0, 0.0, 0.0))));
        assert_eq!(grob.pen.nib(), 4.0);
    }

    #[test]
    fn save_restore_roundtrips_the_state() {
        let mut ctx = Context::new();
        ctx.save();
        ctx.set_fill(Color::WHITE);
        ctx.no_stroke();
        ctx.set_alpha(0.5);
        ctx.translate(10.0, 10.0);
        ctx.restore().unwrap();
        assert_eq!(ctx.state(), &GraphicsState::default());
    }

    #[test]
    fn restore_past_the_bottom_underflows() {
        let mut ctx = Context::new();
        ctx.save();
        ctx.restore().unwrap();
        let err = ctx.restore().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::StackUnderflow(_)));
        assert_eq!(err.to_string(), "restore: too many restore calls");
    }

    #[test]
    fn transform_pop_past_the_bottom_underflows() {
        let mut ctx = Context::new();
        ctx.push();
        ctx.pop().unwrap();
        let err = ctx.pop().unwrap_err();
        assert_eq!(err.to_string(), "pop: too many pops");
    }

    #[test]
    fn transform_push_pop_is_independent_of_save_restore() {
        let mut ctx = Context::new();
        ctx.push();
        ctx.translate(25.0, 0.0);
        ctx.pop().unwrap();
        assert!(ctx.transform().approx_eq(&Transform::IDENTITY, 1e-12));
    }

    #[test]
    fn scoped_state_rolls_back_even_on_error() {
        let mut ctx = Context::new();
        let result: Result<(), Error> = ctx.with_state(|ctx| {
            ctx.set_fill(Color::WHITE);
            ctx.save();
            ctx.save();
            Err(invalid_arg("boom"))
        });
        assert!(result.is_err());
        assert_eq!(ctx.state(), &GraphicsState::default());
        // The aborted body's unbalanced saves must not linger.
        assert!(ctx.restore().is_err());
    }

    #[test]
    fn narrow_scopes_touch_only_their_field() {
        let mut ctx = Context::new();
        ctx.set_nib(3.0);
        ctx.with_fill(Some(Paint::Solid(Color::WHITE)), |ctx| {
            assert_eq!(ctx.fill(), Some(&Paint::Solid(Color::WHITE)));
            assert_eq!(ctx.nib(), 3.0);
            Ok(())
        })
        .unwrap();
        assert_eq!(ctx.fill(), Some(&Paint::Solid(Color::BLACK)));
        assert_eq!(ctx.nib(), 3.0);
    }

    #[test]
    fn scoped_color_mode_interprets_channels() {
        let mut ctx = Context::new();
        let c = ctx
            .with_color_mode(ColorMode::Rgb, 255.0, |ctx| ctx.color(&[255.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(ctx.color_range(), 1.0);
    }

    #[test]
    fn rotate_by_follows_the_rotation_unit() {
        let mut degrees = Context::new();
        degrees.rotate_by(90.0);
        let mut percent = Context::new();
        percent.set_rotation_unit(RotationUnit::Percent);
        percent.rotate_by(0.25);
        assert!(degrees.transform().approx_eq(percent.transform(), 1e-9));
    }

    #[test]
    fn path_commands_error_without_an_active_path() {
        let mut ctx = Context::new();
        for err in [
            ctx.move_to(0.0, 0.0).unwrap_err(),
            ctx.line_to(1.0, 1.0).unwrap_err(),
            ctx.close_path().unwrap_err(),
            ctx.end_path(false).unwrap_err(),
        ] {
            assert!(matches!(err.kind(), ErrorKind::NoActivePath));
        }
    }

    #[test]
    fn autoclose_closes_an_unclosed_path() {
        let mut ctx = Context::new();
        ctx.begin_path((0.0, 0.0));
        ctx.line_to(100.0, 0.0).unwrap();
        ctx.line_to(100.0, 100.0).unwrap();
        let path = ctx.end_path(false).unwrap();
        assert_eq!(path.elements().last(), Some(&kurbo::PathEl::ClosePath));

        ctx.set_autoclose(false);
        ctx.begin_path((0.0, 0.0));
        ctx.line_to(100.0, 0.0).unwrap();
        let path = ctx.end_path(false).unwrap();
        assert_ne!(path.elements().last(), Some(&kurbo::PathEl::ClosePath));
    }

    #[test]
    fn only_the_first_close_takes_effect() {
        let mut ctx = Context::new();
        ctx.begin_path((0.0, 0.0));
        ctx.line_to(10.0, 0.0).unwrap();
        ctx.close_path().unwrap();
        ctx.close_path().unwrap();
        ctx.close_path().unwrap();
        let path = ctx.end_path(false).unwrap();
        let closes = path
            .elements()
            .iter()
            .filter(|el| matches!(el, kurbo::PathEl::ClosePath))
            .count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn primitives_feed_an_open_path_instead_of_plotting() {
        let mut ctx = Context::new();
        ctx.begin_path(None);
        assert_eq!(ctx.rect(0.0, 0.0, 50.0, 50.0, RectCorners::Sharp), None);
        assert_eq!(ctx.oval(60.0, 0.0, 50.0, 50.0, None), None);
        assert!(ctx.canvas().is_empty());
        let path = ctx.end_path(true).unwrap();
        // Two contours merged into one grob.
        assert_eq!(ctx.canvas().len(), 1);
        let moves = path
            .elements()
            .iter()
            .filter(|el| matches!(el, kurbo::PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn autoplot_off_builds_without_plotting() {
        let mut ctx = Context::new();
        ctx.with_autoplot(false, |ctx| {
            assert_eq!(ctx.rect(0.0, 0.0, 10.0, 10.0, RectCorners::Sharp), None);
            assert_eq!(ctx.text("hi", 0.0, 0.0), None);
            Ok(())
        })
        .unwrap();
        assert!(ctx.canvas().is_empty());
        assert!(ctx.autoplot());
    }

    #[test]
    fn roundness_scales_with_the_short_side() {
        let mut ctx = Context::new();
        ctx.rect(0.0, 0.0, 100.0, 40.0, RectCorners::Roundness(1.0));
        let grob = first_path(&ctx);
        let curves = grob
            .path
            .elements()
            .iter()
            .filter(|el| matches!(el, kurbo::PathEl::CurveTo(..)))
            .count();
        assert_eq!(curves, 4);
        // Full roundness on a 100x40 rect means a 20 unit corner radius.
        assert_eq!(
            grob.path.elements().first(),
            Some(&kurbo::PathEl::MoveTo((20.0, 0.0).into()))
        );
    }

    #[test]
    fn degenerate_primitives_are_rejected() {
        let mut ctx = Context::new();
        assert!(ctx.poly(0.0, 0.0, 10.0, 2).is_err());
        assert!(ctx.star(0.0, 0.0, 2, 10.0, None).is_err());
        assert!(ctx.canvas().is_empty());
    }

    #[test]
    fn star_inner_radius_defaults_to_half() {
        let mut ctx = Context::new();
        ctx.star(0.0, 0.0, 5, 100.0, None).unwrap();
        let explicit = {
            let mut path = BezierPath::new();
            path.star(0.0, 0.0, 5, 100.0, 50.0);
            path
        };
        assert_eq!(first_path(&ctx).path, explicit);
    }

    #[test]
    fn corner_mode_anchors_at_the_origin() {
        let mut ctx = Context::new();
        ctx.set_transform_mode(TransformMode::Corner);
        ctx.scale(2.0, None);
        ctx.rect(10.0, 10.0, 20.0, 20.0, RectCorners::Sharp);
        let corner = first_path(&ctx).transform.apply((10.0, 10.0).into());
        assert!((corner.x - 20.0).abs() < 1e-9 && (corner.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn center_mode_pivots_each_grob_on_itself() {
        let mut ctx = Context::new();
        ctx.scale(2.0, None);
        ctx.rect(10.0, 10.0, 20.0, 20.0, RectCorners::Sharp);
        // The rect's center (20, 20) stays put under a centered scale.
        let center = first_path(&ctx).transform.apply((20.0, 20.0).into());
        assert!((center.x - 20.0).abs() < 1e-9 && (center.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn layer_merges_effects_and_restores_on_exit() {
        let mut ctx = Context::new();
        ctx.set_alpha(0.5);
        ctx.layer(Effect::new().with_blend(BlendMode::Multiply), |ctx| {
            // Inside the layer the working effect starts clean.
            assert_eq!(ctx.alpha(), 1.0);
            ctx.rect(0.0, 0.0, 10.0, 10.0, RectCorners::Sharp);
            Ok(())
        })
        .unwrap();
        assert_eq!(ctx.alpha(), 0.5);

        let layer = match ctx.canvas().iter().next().unwrap() {
            Grob::Layer(g) => g,
            other => panic!("expected a layer, got {other:?}"),
        };
        assert_eq!(layer.effect.alpha, Some(0.5));
        assert_eq!(layer.effect.blend, Some(BlendMode::Multiply));
        assert_eq!(layer.contents.len(), 1);
    }

    #[test]
    fn layer_restores_even_when_the_body_errors() {
        let mut ctx = Context::new();
        ctx.set_alpha(0.25);
        let result: Result<(), Error> =
            ctx.layer(Effect::new(), |_| Err(invalid_arg("boom")));
        assert_eq!(result.unwrap_err().to_string(), "boom");
        assert_eq!(ctx.alpha(), 0.25);
        assert_eq!(ctx.canvas().depth(), 0);
    }

    #[test]
    fn clip_scrubs_earlier_plots_of_the_mask_path() {
        let mut ctx = Context::new();
        let mut mask = BezierPath::new();
        mask.oval(0.0, 0.0, 100.0, 100.0, None);
        ctx.draw_path(mask.clone());
        assert_eq!(ctx.canvas().len(), 1);

        ctx.clip(mask, ClipStyle::Inside, |ctx| {
            ctx.rect(25.0, 25.0, 50.0, 50.0, RectCorners::Sharp);
            Ok(())
        })
        .unwrap();

        // The plotted oval is gone; only the mask container remains.
        assert_eq!(ctx.canvas().len(), 1);
        let mask = match ctx.canvas().iter().next().unwrap() {
            Grob::Mask(g) => g,
            other => panic!("expected a mask, got {other:?}"),
        };
        assert_eq!(mask.contents.len(), 1);
    }

    #[test]
    fn pie_slices_reach_the_canvas() {
        let mut ctx = Context::new();
        ctx.arc(
            50.0,
            50.0,
            40.0,
            ArcSlice::new(ArcRange::To(120.0)).closed(),
        );
        assert_eq!(ctx.canvas().len(), 1);
    }

    #[test]
    fn text_inherits_style_and_stylesheet() {
        let mut ctx = Context::new();
        ctx.set_font("Georgia", 14.0);
        ctx.set_align(TextAlign::Center);
        ctx.stylesheet_mut()
            .define("em", crate::typography::StylePatch::new().italic(true));
        ctx.text_block("hello <em>there</em>", 10.0, 20.0, 200.0, None);

        let grob = match ctx.canvas().iter().next().unwrap() {
            Grob::Text(g) => g,
            other => panic!("expected text, got {other:?}"),
        };
        assert_eq!(grob.style.family, "Georgia");
        assert_eq!(grob.style.size, 14.0);
        assert_eq!(grob.style.align, TextAlign::Center);
        assert_eq!(grob.width, Some(200.0));
        assert!(grob.stylesheet.get("em").is_some());
    }

    #[test]
    fn reset_state_leaves_the_canvas_alone() {
        let mut ctx = Context::new();
        ctx.rect(0.0, 0.0, 10.0, 10.0, RectCorners::Sharp);
        ctx.set_fill(Color::WHITE);
        ctx.translate(5.0, 5.0);
        ctx.reset_state();
        assert_eq!(ctx.state(), &GraphicsState::default());
        assert_eq!(ctx.canvas().len(), 1);
    }
}
