//! Dynamic Assets
//!
//! Generates social cards, OG images and similar assets on request by
//! rendering a component tree to SVG and, when asked for, rasterizing that
//! SVG to JPEG.
//!
//! # Features
//!
//! - **Three output kinds**: `svg`, `jpg` and a `debug` HTML page that shows
//!   the component scaled down over a patterned background
//! - **Registry**: assets are named after the file that declares them
//!   (`_OgImage.json` is served as `OgImage`)
//! - **Explicit dev/prod I/O**: fonts and images are read from disk in
//!   development and fetched relative to the site origin otherwise
//!
//! # Example
//!
//! ```no_run
//! use dynamic_assets::{AssetImageConfig, AssetRegistry, AssetResponder, AssetsConfig, RenderRequest};
//! use dynamic_assets::registry::AssetDefinition;
//! use dynamic_assets::tree::{Element, Node};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = AssetRegistry::new();
//! registry.register(AssetDefinition::new(
//!     "src/assets/_OgImage.tsx",
//!     AssetImageConfig { width: 1200, height: 630, debug_scale: None },
//!     |ctx| async move {
//!         let title = ctx.param("title").unwrap_or("Hello").to_string();
//!         Ok::<Node, dynamic_assets::Error>(Element::new("div").text(title).into())
//!     },
//! ))?;
//!
//! let config = AssetsConfig { site: "https://example.com".into(), ..Default::default() };
//! let responder = AssetResponder::new(config, registry)?;
//! let response = responder.handle(&RenderRequest::new("OgImage", "svg")).await;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod image_ref;
pub mod loader;
pub mod registry;
pub mod rendering;
pub mod responder;
pub mod tree;

pub use registry::{derive_asset_name, AssetDefinition, AssetRegistry, RenderContext};
pub use responder::{AssetResponder, AssetResponse, OutputKind, RenderRequest, RenderedAsset};

/// Debug scale used when an asset does not declare one
pub const DEFAULT_DEBUG_SCALE: f64 = 0.4;

/// Plugin configuration
///
/// Owned by the caller and handed to the responder at construction time.
/// `dev` replaces any ambient "is this a development build" flag so the
/// responder never inspects process state.
///
/// # Examples
///
/// ```
/// let cfg = dynamic_assets::AssetsConfig::default();
/// assert_eq!(cfg.fetch_timeout_ms, 10_000);
/// assert!(!cfg.dev);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetsConfig {
    /// Fonts made available to the vector renderer and the debug page
    pub fonts: Vec<FontSpec>,
    /// Theme colours
    pub theme: Theme,
    /// Site origin used to resolve relative font and image URLs
    pub site: String,
    /// Whether the site is served on demand; static builds read images from disk
    pub ssr: bool,
    /// Development mode: read fonts and images from the local filesystem
    pub dev: bool,
    /// Directory holding public files (fonts) in development mode
    pub public_dir: PathBuf,
    /// Upper bound for every font or image read in milliseconds
    pub fetch_timeout_ms: u64,
    /// JPEG quality between 1 and 100
    pub jpeg_quality: u8,
    /// Repeating background image of the debug page
    pub debug_background: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            theme: Theme::default(),
            site: String::new(),
            ssr: false,
            dev: false,
            public_dir: PathBuf::from("public"),
            fetch_timeout_ms: 10_000,
            jpeg_quality: 90,
            debug_background: "/debug.png".to_string(),
        }
    }
}

impl AssetsConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Check the invariants the responder relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.dev {
            url::Url::parse(&self.site)
                .map_err(|e| Error::ConfigError(format!("site '{}' is not an absolute URL: {}", self.site, e)))?;
        }
        if self.fetch_timeout_ms == 0 {
            return Err(Error::ConfigError("fetchTimeoutMs must be positive".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::ConfigError(format!(
                "jpegQuality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        for font in &self.fonts {
            if font.name.trim().is_empty() || font.url.trim().is_empty() {
                return Err(Error::ConfigError("fonts need a name and a url".into()));
            }
        }
        Ok(())
    }
}

/// A font declared in the plugin configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Family name the component tree refers to
    pub name: String,
    /// Path relative to the public directory / site origin
    pub url: String,
    #[serde(default)]
    pub style: FontStyle,
    #[serde(default = "default_weight")]
    pub weight: u16,
}

fn default_weight() -> u16 {
    400
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_css(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

/// Theme colours (any CSS colour string)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub primary: String,
    pub black: String,
    pub white: String,
    pub background: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: "#6d28d9".to_string(),
            black: "#111111".to_string(),
            white: "#ffffff".to_string(),
            background: "#1f1f1f".to_string(),
        }
    }
}

/// Output size of an asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetImageConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub debug_scale: Option<f64>,
}

impl AssetImageConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, debug_scale: None }
    }

    /// Scale of the debug page, falling back to [`DEFAULT_DEBUG_SCALE`]
    pub fn effective_debug_scale(&self) -> f64 {
        self.debug_scale.unwrap_or(DEFAULT_DEBUG_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssetsConfig::default();
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.jpeg_quality, 90);
        assert!(config.fonts.is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let json = r##"{
            "site": "https://example.com",
            "ssr": true,
            "fonts": [{ "name": "Inter", "url": "/fonts/Inter.ttf", "weight": 700 }],
            "theme": { "primary": "#ff0000" }
        }"##;
        let config = AssetsConfig::from_json_str(json).unwrap();
        assert!(config.ssr);
        assert_eq!(config.fonts[0].style, FontStyle::Normal);
        assert_eq!(config.fonts[0].weight, 700);
        assert_eq!(config.theme.primary, "#ff0000");
        assert_eq!(config.theme.white, "#ffffff");
    }

    #[test]
    fn test_config_rejects_relative_site() {
        let config = AssetsConfig { site: "/not/absolute".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let dev = AssetsConfig { dev: true, ..Default::default() };
        assert!(dev.validate().is_ok());
    }

    #[test]
    fn test_debug_scale_default() {
        assert_eq!(AssetImageConfig::new(10, 10).effective_debug_scale(), 0.4);
        let cfg = AssetImageConfig { width: 10, height: 10, debug_scale: Some(0.25) };
        assert_eq!(cfg.effective_debug_scale(), 0.25);
    }
}
