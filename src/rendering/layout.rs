//! Block layout for component trees
//!
//! Elements stack vertically inside their parent's content box. There is no
//! flexbox or inline formatting: text wraps greedily on word boundaries using
//! an estimated advance of 0.6em per character.

use crate::tree::{Element, Node, Style};

const DEFAULT_FONT_SIZE: f32 = 16.0;
const ADVANCE_EM: f32 = 0.6;
const LINE_HEIGHT_EM: f32 = 1.2;
const MAX_FONT_SIZE: f32 = 4096.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub padding: u32,
}

/// Border box of a laid out node plus the spacing around and inside it
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn content_width(&self) -> u32 {
        self.rect.width.saturating_sub(self.box_model.padding.saturating_mul(2))
    }
}

/// Text properties inherited down the tree
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: Option<String>,
    pub size: f32,
    pub weight: u16,
    pub color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: None,
            size: DEFAULT_FONT_SIZE,
            weight: 400,
            color: "#000000".to_string(),
        }
    }
}

impl TextStyle {
    fn inherit(&self, style: &Style) -> Self {
        Self {
            family: style.font_family.clone().or_else(|| self.family.clone()),
            size: style
                .font_size
                .filter(|s| s.is_finite() && *s > 0.0)
                .map_or(self.size, |s| s.min(MAX_FONT_SIZE)),
            weight: style.font_weight.unwrap_or(self.weight),
            color: style.color.clone().unwrap_or_else(|| self.color.clone()),
        }
    }

    pub fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT_EM
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Block { background: Option<String> },
    Text { lines: Vec<String>, style: TextStyle },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub content: Content,
}

/// Lay out `tree` on a `width`x`height` canvas. The root element fills the
/// canvas unless it sets its own size. Nodes come out in paint order.
pub fn layout_tree(tree: &Node, width: u32, height: u32) -> Vec<LayoutNode> {
    let mut nodes = Vec::new();
    let base = TextStyle::default();
    match tree {
        Node::Element(el) => {
            layout_element(el, &base, (0, 0), width, Some(height), &mut nodes);
        }
        Node::Text(text) => {
            layout_text(text, &base, (0, 0), width, &mut nodes);
        }
    }
    nodes
}

fn layout_element(
    el: &Element,
    parent: &TextStyle,
    origin: (i32, i32),
    available: u32,
    fill_height: Option<u32>,
    nodes: &mut Vec<LayoutNode>,
) -> u32 {
    let margin = el.style.margin.unwrap_or(0);
    let padding = el.style.padding.unwrap_or(0);
    let style = parent.inherit(&el.style);

    let outer = available.saturating_sub(margin.saturating_mul(2));
    let width = el.style.width.map_or(outer, |w| w.min(outer));
    let x = offset(origin.0, margin);
    let y = offset(origin.1, margin);

    // Reserve the slot so the background paints beneath the children.
    let slot = nodes.len();
    nodes.push(LayoutNode {
        lb: LayoutBox {
            rect: Rect { x, y, width, height: 0 },
            box_model: BoxModel { margin, padding },
        },
        content: Content::Block {
            background: el.style.background.clone(),
        },
    });

    let inner_x = offset(x, padding);
    let inner_w = width.saturating_sub(padding.saturating_mul(2));
    let mut content_h: u32 = 0;
    for child in &el.children {
        let cursor = offset(offset(y, padding), content_h);
        let used = match child {
            Node::Element(child_el) => layout_element(child_el, &style, (inner_x, cursor), inner_w, None, nodes),
            Node::Text(text) => layout_text(text, &style, (inner_x, cursor), inner_w, nodes),
        };
        content_h = content_h.saturating_add(used);
    }

    let height = el
        .style
        .height
        .or_else(|| fill_height.map(|h| h.saturating_sub(margin.saturating_mul(2))))
        .unwrap_or_else(|| content_h.saturating_add(padding.saturating_mul(2)));
    nodes[slot].lb.rect.height = height;

    height.saturating_add(margin.saturating_mul(2))
}

/// `base + by`, clamped to the `i32` range
fn offset(base: i32, by: u32) -> i32 {
    i32::try_from(i64::from(base) + i64::from(by)).unwrap_or(i32::MAX)
}

fn layout_text(text: &str, style: &TextStyle, origin: (i32, i32), available: u32, nodes: &mut Vec<LayoutNode>) -> u32 {
    let lines = wrap_text(text, available, style.size);
    if lines.is_empty() {
        return 0;
    }
    let height = (lines.len() as f32 * style.line_height()).round() as u32;
    nodes.push(LayoutNode {
        lb: LayoutBox {
            rect: Rect {
                x: origin.0,
                y: origin.1,
                width: available,
                height,
            },
            box_model: BoxModel { margin: 0, padding: 0 },
        },
        content: Content::Text {
            lines,
            style: style.clone(),
        },
    });
    height
}

/// Greedy word wrap. Words wider than a line get a line of their own.
pub fn wrap_text(text: &str, width: u32, font_size: f32) -> Vec<String> {
    let advance = (font_size * ADVANCE_EM).max(1.0);
    let chars_per_line = ((width as f32 / advance).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let cur_len = cur.chars().count();
        if cur_len > 0 && cur_len + word.chars().count() + 1 > chars_per_line {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}
