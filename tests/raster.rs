//! JPEG output through the responder with real font data
#![cfg(feature = "raster")]

use std::path::Path;

use dynamic_assets::registry::AssetDefinition;
use dynamic_assets::tree::{Element, Node};
use dynamic_assets::{
    AssetImageConfig, AssetRegistry, AssetResponder, AssetsConfig, FontSpec, FontStyle, RenderContext,
    RenderRequest,
};

const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn headline(ctx: &RenderContext) -> dynamic_assets::Result<Node> {
    let title = ctx.param("title").unwrap_or("Hello").to_string();
    Ok(Element::new("div")
        .background("#ffffff")
        .color("#000000")
        .padding(20)
        .child(Element::new("h1").font("Brand", 64.0, 700).text(title))
        .into())
}

fn oversized(_: &RenderContext) -> dynamic_assets::Result<Node> {
    Ok(Element::new("div")
        .padding(u32::MAX)
        .child(Element::new("div").size(10, u32::MAX).margin(1).background("#ff0000"))
        .child(Element::new("p").font("Brand", f32::MAX, 900).text("huge"))
        .into())
}

/// A `public/` directory holding the system font under `fonts/brand.ttf`.
/// `None` when the font is not installed on this machine.
fn public_dir_with_font() -> Option<tempfile::TempDir> {
    let data = std::fs::read(SYSTEM_FONT).ok()?;
    let public = tempfile::tempdir().unwrap();
    std::fs::create_dir(public.path().join("fonts")).unwrap();
    std::fs::write(public.path().join("fonts/brand.ttf"), data).unwrap();
    Some(public)
}

fn registry() -> AssetRegistry {
    let mut registry = AssetRegistry::new();
    registry
        .register(AssetDefinition::new_sync("_Headline.tsx", AssetImageConfig::new(400, 120), headline))
        .unwrap();
    registry
        .register(AssetDefinition::new_sync("_Oversized.tsx", AssetImageConfig::new(50, 50), oversized))
        .unwrap();
    registry
}

fn responder(public: &Path) -> AssetResponder {
    let config = AssetsConfig {
        dev: true,
        public_dir: public.to_path_buf(),
        fonts: vec![FontSpec {
            // Deliberately not the family name stored in the file ("DejaVu Sans").
            name: "Brand".into(),
            url: "/fonts/brand.ttf".into(),
            style: FontStyle::Normal,
            weight: 700,
        }],
        ..Default::default()
    };
    AssetResponder::new(config, registry()).unwrap()
}

fn dark_pixels(jpg: &[u8]) -> usize {
    let decoded = image::load_from_memory(jpg).unwrap().to_rgb8();
    decoded.pixels().filter(|p| p.0.iter().all(|c| *c < 100)).count()
}

#[tokio::test]
async fn jpg_draws_text_with_an_aliased_font() {
    let Some(public) = public_dir_with_font() else {
        eprintln!("skipping: {} not installed", SYSTEM_FONT);
        return;
    };
    let responder = responder(public.path());

    let req = RenderRequest::new("Headline", "jpg").with_param("title", "Hello");
    let res = responder.handle(&req).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.content_type(), Some("image/jpeg"));

    let decoded = image::load_from_memory(&res.body).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (400, 120));
    assert!(dark_pixels(&res.body) > 100, "no glyphs were drawn");

    // Same canvas with nothing to draw stays blank.
    let blank = responder.handle(&RenderRequest::new("Headline", "jpg").with_param("title", " ")).await;
    assert_eq!(blank.status, 200);
    assert_eq!(dark_pixels(&blank.body), 0);
}

#[tokio::test]
async fn oversized_styles_do_not_panic() {
    let config = AssetsConfig { dev: true, ..Default::default() };
    let responder = AssetResponder::new(config, registry()).unwrap();
    for kind in ["svg", "jpg", "debug"] {
        let res = responder.handle(&RenderRequest::new("Oversized", kind)).await;
        assert!(res.status == 200 || res.status == 500, "kind {} gave {}", kind, res.status);
    }
    let svg = responder.handle(&RenderRequest::new("Oversized", "svg")).await;
    assert_eq!(svg.status, 200);
    assert!(!String::from_utf8(svg.body).unwrap().contains("NaN"));
}
