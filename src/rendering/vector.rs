//! Component tree to SVG

use svg::node::element::{Rectangle, Text};
use svg::Document;

use super::layout::layout_tree;
use super::paint::{paint, PaintCommand};
use crate::loader::LoadedFont;
use crate::tree::Node;
use crate::{Error, Result};

const FALLBACK_FAMILY: &str = "sans-serif";

/// Lays out a component tree and serializes it as vector markup
pub trait VectorRenderer: Send + Sync {
    fn render(&self, tree: &Node, width: u32, height: u32, fonts: &[LoadedFont]) -> Result<String>;
}

/// The built-in renderer: block layout, one `<rect>` per background and one
/// `<text>` per wrapped line. Text references font families by their
/// configured names, which the rasterizer registers as aliases for the
/// loaded font bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutRenderer;

impl VectorRenderer for LayoutRenderer {
    fn render(&self, tree: &Node, width: u32, height: u32, fonts: &[LoadedFont]) -> Result<String> {
        if width == 0 || height == 0 {
            return Err(Error::RenderError(format!("invalid canvas size {}x{}", width, height)));
        }

        let resolve = |requested: Option<&str>| -> String {
            match requested {
                Some(name) if fonts.is_empty() || fonts.iter().any(|f| f.name == name) => name.to_string(),
                _ => fonts
                    .first()
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| FALLBACK_FAMILY.to_string()),
            }
        };
        let cmds = paint(&layout_tree(tree, width, height), resolve);

        let mut doc = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height));
        for cmd in cmds {
            doc = match cmd {
                PaintCommand::SolidRect { x, y, width, height, fill } => doc.add(
                    Rectangle::new()
                        .set("x", x)
                        .set("y", y)
                        .set("width", width)
                        .set("height", height)
                        .set("fill", fill),
                ),
                PaintCommand::Text { x, y, text, family, size, weight, fill } => doc.add(
                    Text::new(text)
                        .set("x", x)
                        .set("y", y)
                        .set("font-family", family_list(&family))
                        .set("font-size", size)
                        .set("font-weight", u32::from(weight))
                        .set("fill", fill),
                ),
            };
        }
        Ok(doc.to_string())
    }
}

fn family_list(family: &str) -> String {
    if family == FALLBACK_FAMILY {
        family.to_string()
    } else {
        format!("{}, {}", family, FALLBACK_FAMILY)
    }
}
