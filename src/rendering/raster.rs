//! SVG to JPEG

use crate::loader::LoadedFont;
use crate::Result;

/// Turns vector markup into compressed raster bytes
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, svg: &str, fonts: &[LoadedFont]) -> Result<Vec<u8>>;
}

#[cfg(feature = "raster")]
pub use self::jpeg::JpegRasterizer;

#[cfg(feature = "raster")]
mod jpeg {
    use image::codecs::jpeg::JpegEncoder;
    use image::ExtendedColorType;
    use resvg::tiny_skia::Pixmap;
    use resvg::usvg::fontdb::{self, Database, Language};
    use resvg::usvg::{Options, Transform, Tree};

    use super::Rasterizer;
    use crate::loader::LoadedFont;
    use crate::{Error, FontStyle, Result};

    /// Renders with resvg and encodes the pixmap as JPEG. JPEG has no alpha,
    /// so transparent regions are flattened over `background`.
    #[derive(Debug, Clone, Copy)]
    pub struct JpegRasterizer {
        pub quality: u8,
        pub background: [u8; 3],
    }

    impl Default for JpegRasterizer {
        fn default() -> Self {
            Self {
                quality: 90,
                background: [255, 255, 255],
            }
        }
    }

    impl JpegRasterizer {
        pub fn new(quality: u8) -> Self {
            Self {
                quality: quality.clamp(1, 100),
                ..Default::default()
            }
        }
    }

    impl Rasterizer for JpegRasterizer {
        fn rasterize(&self, svg: &str, fonts: &[LoadedFont]) -> Result<Vec<u8>> {
            let font_db = font_database(fonts);

            let opt = Options::default();
            let rtree = Tree::from_data(svg.as_bytes(), &opt, &font_db)
                .map_err(|e| Error::RasterError(format!("Failed to parse SVG: {}", e)))?;
            let size = rtree.size();
            let (width, height) = (size.width().ceil() as u32, size.height().ceil() as u32);

            let mut pixmap = Pixmap::new(width, height)
                .ok_or_else(|| Error::RasterError(format!("Failed to create {}x{} pixmap", width, height)))?;
            resvg::render(&rtree, Transform::identity(), &mut pixmap.as_mut());

            let rgb = flatten(pixmap.data(), self.background);
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, self.quality)
                .encode(&rgb, width, height, ExtendedColorType::Rgb8)
                .map_err(|e| Error::RasterError(format!("Failed to encode JPEG: {}", e)))?;
            Ok(out)
        }
    }

    /// Register every face under the configured name, which need not match
    /// the family recorded in the font file. The configured style and weight
    /// win over the file's own metadata.
    pub(super) fn font_database(fonts: &[LoadedFont]) -> Database {
        let mut font_db = Database::new();
        for font in fonts {
            let mut parsed = Database::new();
            parsed.load_font_data(font.data.clone());
            if parsed.is_empty() {
                log::warn!("font '{}' holds no usable faces", font.name);
                continue;
            }
            for face in parsed.faces() {
                let mut info = face.clone();
                info.families.insert(0, (font.name.clone(), Language::English_UnitedStates));
                info.style = match font.style {
                    FontStyle::Normal => fontdb::Style::Normal,
                    FontStyle::Italic => fontdb::Style::Italic,
                };
                info.weight = fontdb::Weight(font.weight);
                font_db.push_face_info(info);
            }
        }
        if let Some(first) = fonts.first() {
            font_db.set_sans_serif_family(first.name.clone());
        }
        font_db
    }

    /// Composite premultiplied RGBA over an opaque background colour.
    pub(super) fn flatten(rgba: &[u8], background: [u8; 3]) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
        for px in rgba.chunks_exact(4) {
            let inv = 255 - px[3] as u32;
            for c in 0..3 {
                let v = px[c] as u32 + (background[c] as u32 * inv + 127) / 255;
                rgb.push(v.min(255) as u8);
            }
        }
        rgb
    }
}
