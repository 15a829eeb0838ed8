//! Debug page: the component as HTML, scaled down over a patterned background

use std::fmt::Write as _;

use maud::{html, PreEscaped, DOCTYPE};

use crate::tree::Node;
use crate::{AssetImageConfig, FontSpec, Theme};

/// Build the debug document for `tree`.
///
/// The page declares `--width`, `--height` and `--scale` CSS variables and
/// one `@font-face` per configured font, pointing at the font's public URL.
pub fn debug_document(
    tree: &Node,
    config: &AssetImageConfig,
    fonts: &[FontSpec],
    theme: &Theme,
    background_url: &str,
) -> String {
    let css = stylesheet(config, fonts, theme, background_url);
    html! {
        (DOCTYPE)
        html {
            head {
                title { "Debug" }
                style { (PreEscaped(css)) }
            }
            body {
                div #screen {
                    div #render { (tree) }
                }
            }
        }
    }
    .into_string()
}

fn stylesheet(config: &AssetImageConfig, fonts: &[FontSpec], theme: &Theme, background_url: &str) -> String {
    let mut css = String::new();
    for font in fonts {
        let _ = write!(
            css,
            r#"
@font-face {{
  font-family: {name};
  font-style: {style};
  font-weight: {weight};
  src: url("{url}") format("truetype");
}}"#,
            name = font.name,
            style = font.style.as_css(),
            weight = font.weight,
            url = font.url,
        );
    }
    let _ = write!(
        css,
        r#"
:root {{
  --width: {width}px;
  --height: {height}px;
  --scale: {scale};
}}
body {{
  background: {background} url('{background_url}') repeat;
  margin: 0;
  width: 100vw;
  height: 100vh;
  display: flex;
  align-items: center;
  justify-content: center;
  min-width: calc(var(--width) * var(--scale));
  min-height: calc(var(--height) * var(--scale));
}}
#screen {{
  width: calc(var(--width) * var(--scale));
  height: calc(var(--height) * var(--scale));
  overflow: hidden;
}}
#render {{
  width: var(--width);
  height: var(--height);
  flex: none;
  transform: scale(var(--scale));
  transform-origin: top left;
  background: black;
}}
"#,
        width = config.width,
        height = config.height,
        scale = config.effective_debug_scale(),
        background = theme.background,
        background_url = background_url,
    );
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Element;
    use crate::FontStyle;

    fn fonts() -> Vec<FontSpec> {
        vec![
            FontSpec { name: "Inter".into(), url: "/fonts/Inter.ttf".into(), style: FontStyle::Normal, weight: 400 },
            FontSpec { name: "Inter".into(), url: "/fonts/Inter-Italic.ttf".into(), style: FontStyle::Italic, weight: 400 },
        ]
    }

    #[test]
    fn embeds_default_scale_and_font_faces() {
        let tree: Node = Element::new("h1").text("Hello").into();
        let doc = debug_document(&tree, &AssetImageConfig::new(1200, 630), &fonts(), &Theme::default(), "/debug.png");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("--scale: 0.4;"));
        assert!(doc.contains("--width: 1200px;"));
        assert_eq!(doc.matches("@font-face").count(), 2);
        assert!(doc.contains("font-style: italic;"));
        assert!(doc.contains(r#"src: url("/fonts/Inter-Italic.ttf") format("truetype");"#));
        assert!(doc.contains("<h1>Hello</h1>"));
        assert!(doc.contains("url('/debug.png') repeat"));
        assert!(doc.contains(r#"<div id="screen"><div id="render"><h1>Hello</h1></div></div>"#));
    }

    #[test]
    fn tree_markup_is_escaped() {
        let tree: Node = Element::new("p").attr("title", "\"><script>").text("<b>bold</b>").into();
        let doc = debug_document(&tree, &AssetImageConfig::new(10, 10), &[], &Theme::default(), "/debug.png");
        assert!(!doc.contains("<script>"));
        assert!(!doc.contains("<b>"));
        assert!(doc.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(doc.contains("title=\"&quot;&gt;&lt;script&gt;\""));
    }

    #[test]
    fn uses_declared_scale() {
        let tree: Node = "x".into();
        let config = AssetImageConfig { width: 10, height: 10, debug_scale: Some(0.75) };
        let doc = debug_document(&tree, &config, &[], &Theme::default(), "/debug.png");
        assert!(doc.contains("--scale: 0.75;"));
        assert!(!doc.contains("@font-face"));
    }
}
