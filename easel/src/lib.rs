//! A retained-mode 2D drawing engine with a stateful canvas API.
//!
//! Drawing commands on a [`Context`] snapshot the current fill, stroke,
//! transform, and compositing state into graphic objects ("grobs") that a
//! [`Canvas`] retains in insertion order. A [`Renderer`] backend replays
//! the finished scene to rasterize or export it; the core itself never
//! touches pixels.

pub use kurbo;

mod canvas;
mod color;
mod context;
mod effect;
mod error;
mod grob;
mod image;
mod paint;
mod path;
mod pen;
mod render;
mod transform;
mod typography;

pub use crate::canvas::*;
pub use crate::color::*;
pub use crate::context::*;
pub use crate::effect::*;
pub use crate::error::*;
pub use crate::grob::*;
pub use crate::image::*;
pub use crate::paint::*;
pub use crate::path::*;
pub use crate::pen::*;
pub use crate::render::*;
pub use crate::transform::*;
pub use crate::typography::*;
