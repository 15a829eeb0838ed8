//! Rendering pipeline
//!
//! `layout` positions a component tree, `paint` turns the boxes into draw
//! commands and `vector` serializes those commands as SVG. `raster` turns
//! the SVG into a JPEG and `debug` builds the HTML inspection page.

pub mod debug;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod vector;

pub use vector::{LayoutRenderer, VectorRenderer};

pub use raster::Rasterizer;
#[cfg(feature = "raster")]
pub use raster::JpegRasterizer;
