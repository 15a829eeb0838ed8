//! Paint commands produced from a laid out tree

use super::layout::{Content, LayoutNode};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        fill: String,
    },
    Text {
        x: i32,
        /// Baseline
        y: f32,
        text: String,
        family: String,
        size: f32,
        weight: u16,
        fill: String,
    },
}

/// Turn layout nodes into paint commands. `resolve_family` maps the family a
/// node asked for (if any) to the family actually available.
pub fn paint<F>(nodes: &[LayoutNode], resolve_family: F) -> Vec<PaintCommand>
where
    F: Fn(Option<&str>) -> String,
{
    let mut cmds = Vec::new();
    for node in nodes {
        let rect = &node.lb.rect;
        match &node.content {
            Content::Block { background: Some(fill) } if rect.width > 0 && rect.height > 0 => {
                cmds.push(PaintCommand::SolidRect {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    fill: fill.clone(),
                });
            }
            Content::Block { .. } => {}
            Content::Text { lines, style } => {
                let family = resolve_family(style.family.as_deref());
                let line_height = style.line_height();
                for (i, line) in lines.iter().enumerate() {
                    cmds.push(PaintCommand::Text {
                        x: rect.x,
                        y: rect.y as f32 + style.size + i as f32 * line_height,
                        text: line.clone(),
                        family: family.clone(),
                        size: style.size,
                        weight: style.weight,
                        fill: style.color.clone(),
                    });
                }
            }
        }
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::layout_tree;
    use crate::tree::{Element, Node};

    #[test]
    fn paints_backgrounds_then_text_lines() {
        let tree: Node = Element::new("div")
            .background("#fff")
            .child(Element::new("p").text("one two").font("Inter", 10.0, 400))
            .into();
        // 30px wide => 5 chars per line => two lines
        let cmds = paint(&layout_tree(&tree, 30, 40), |f| f.unwrap_or("sans-serif").to_string());
        assert_eq!(cmds.len(), 3);
        assert!(matches!(&cmds[0], PaintCommand::SolidRect { fill, width: 30, height: 40, .. } if fill == "#fff"));
        match (&cmds[1], &cmds[2]) {
            (PaintCommand::Text { y: y1, text: t1, family, .. }, PaintCommand::Text { y: y2, text: t2, .. }) => {
                assert_eq!(family, "Inter");
                assert_eq!((t1.as_str(), t2.as_str()), ("one", "two"));
                assert_eq!(*y1, 10.0);
                assert!((*y2 - 22.0).abs() < 1e-3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn blocks_without_background_paint_nothing() {
        let tree: Node = Element::new("div").into();
        assert!(paint(&layout_tree(&tree, 10, 10), |_| String::new()).is_empty());
    }
}
