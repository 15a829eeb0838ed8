//! Component trees
//!
//! A component tree is what an asset's render function returns. It is laid
//! out into SVG by [`crate::rendering::vector`] and rendered to static HTML
//! for the debug page by [`Node::to_static_markup`].

use std::collections::BTreeMap;
use std::fmt::Write as _;

use maud::Render;
use serde::{Deserialize, Serialize};

use crate::registry::RenderContext;

/// A node in a component tree: either literal text or an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// The subset of CSS understood by the layout renderer. Pixel values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub padding: Option<u32>,
    pub margin: Option<u32>,
    pub background: Option<String>,
    pub color: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
}

impl Style {
    /// Inline CSS declarations for the fields that are set
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        let mut push = |name: &str, value: String| {
            if !css.is_empty() {
                css.push(';');
            }
            let _ = write!(css, "{}:{}", name, value);
        };
        if let Some(w) = self.width {
            push("width", format!("{}px", w));
        }
        if let Some(h) = self.height {
            push("height", format!("{}px", h));
        }
        if let Some(p) = self.padding {
            push("padding", format!("{}px", p));
        }
        if let Some(m) = self.margin {
            push("margin", format!("{}px", m));
        }
        if let Some(bg) = &self.background {
            push("background", bg.clone());
        }
        if let Some(c) = &self.color {
            push("color", c.clone());
        }
        if let Some(f) = &self.font_family {
            push("font-family", f.clone());
        }
        if let Some(s) = self.font_size {
            push("font-size", format!("{}px", s));
        }
        if let Some(w) = self.font_weight {
            push("font-weight", w.to_string());
        }
        css
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            style: Style::default(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.style.width = Some(width);
        self.style.height = Some(height);
        self
    }

    pub fn padding(mut self, px: u32) -> Self {
        self.style.padding = Some(px);
        self
    }

    pub fn margin(mut self, px: u32) -> Self {
        self.style.margin = Some(px);
        self
    }

    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.style.background = Some(color.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.style.color = Some(color.into());
        self
    }

    pub fn font(mut self, family: impl Into<String>, size: f32, weight: u16) -> Self {
        self.style.font_family = Some(family.into());
        self.style.font_size = Some(size);
        self.style.font_weight = Some(weight);
        self
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

// HTML void elements never get a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// Static HTML with inline styles. Text and attribute values are escaped
/// by maud.
impl Render for Node {
    fn render_to(&self, buffer: &mut String) {
        match self {
            Node::Text(text) => text.render_to(buffer),
            Node::Element(el) => {
                buffer.push('<');
                buffer.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    push_attr(buffer, name, value);
                }
                let css = el.style.to_css();
                if !css.is_empty() {
                    push_attr(buffer, "style", &css);
                }
                buffer.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in &el.children {
                    child.render_to(buffer);
                }
                buffer.push_str("</");
                buffer.push_str(&el.tag);
                buffer.push('>');
            }
        }
    }
}

fn push_attr(buffer: &mut String, name: &str, value: &str) {
    buffer.push(' ');
    buffer.push_str(name);
    buffer.push_str("=\"");
    value.render_to(buffer);
    buffer.push('"');
}

impl Node {
    /// Render the tree to static HTML with inline styles.
    pub fn to_static_markup(&self) -> String {
        self.render().into_string()
    }

    /// Replace `{{name}}` placeholders in text and attribute values with route
    /// parameters; `{{site}}` expands to the site origin. Unknown placeholders
    /// expand to an empty string.
    pub fn substitute(&self, ctx: &RenderContext) -> Node {
        match self {
            Node::Text(text) => Node::Text(expand_placeholders(text, ctx)),
            Node::Element(el) => Node::Element(Element {
                tag: el.tag.clone(),
                style: el.style.clone(),
                attrs: el
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), expand_placeholders(v, ctx)))
                    .collect(),
                children: el.children.iter().map(|c| c.substitute(ctx)).collect(),
            }),
        }
    }

    /// All text content in document order, concatenated
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(el) => el.children.iter().map(|c| c.text_content()).collect(),
        }
    }
}

fn expand_placeholders(input: &str, ctx: &RenderContext) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                let value = if key == "site" {
                    ctx.site.as_deref()
                } else {
                    ctx.param(key)
                };
                out.push_str(value.unwrap_or_default());
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
