//! The asset endpoint: request in, complete HTTP-style response out

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use reqwest::Client;

use crate::loader::{load_fonts, ByteSource, LoadedFont};
use crate::registry::{AssetRegistry, RenderContext};
use crate::rendering::debug::debug_document;
use crate::rendering::{LayoutRenderer, Rasterizer, VectorRenderer};
use crate::{AssetsConfig, Error, Result};

/// Route parameter carrying the asset id
pub const IMAGE_PARAM: &str = "__image";
/// Route parameter carrying the output kind
pub const TYPE_PARAM: &str = "__type";

const FAILED_BODY: &str = "Failed to generate asset";

/// Supported output representations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Debug,
    Jpg,
    Svg,
}

impl OutputKind {
    /// `None` for anything outside `debug`, `jpg` and `svg`.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "debug" => Some(OutputKind::Debug),
            "jpg" => Some(OutputKind::Jpg),
            "svg" => Some(OutputKind::Svg),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputKind::Debug => "text/html; charset=utf-8",
            OutputKind::Jpg => "image/jpeg",
            OutputKind::Svg => "image/svg+xml",
        }
    }
}

/// One incoming asset request
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub asset_id: String,
    /// Raw `__type` value; unknown kinds produce a 404
    pub output_kind: String,
    pub route_params: HashMap<String, String>,
    /// Overrides the configured site origin for this request
    pub site_origin: Option<String>,
}

impl RenderRequest {
    pub fn new(asset_id: impl Into<String>, output_kind: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            output_kind: output_kind.into(),
            ..Default::default()
        }
    }

    /// Build a request from framework route parameters (`__image`, `__type`).
    pub fn from_route_params(params: HashMap<String, String>, site_origin: Option<String>) -> Self {
        Self {
            asset_id: params.get(IMAGE_PARAM).cloned().unwrap_or_default(),
            output_kind: params.get(TYPE_PARAM).cloned().unwrap_or_default(),
            route_params: params,
            site_origin,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_params.insert(name.into(), value.into());
        self
    }
}

/// What a successful render produced
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedAsset {
    Vector(String),
    RasterImage(Vec<u8>),
    DebugDocument(String),
}

impl RenderedAsset {
    pub fn kind(&self) -> OutputKind {
        match self {
            RenderedAsset::Vector(_) => OutputKind::Svg,
            RenderedAsset::RasterImage(_) => OutputKind::Jpg,
            RenderedAsset::DebugDocument(_) => OutputKind::Debug,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            RenderedAsset::Vector(s) | RenderedAsset::DebugDocument(s) => s.into_bytes(),
            RenderedAsset::RasterImage(b) => b,
        }
    }
}

/// HTTP-style response handed back to the framework
#[derive(Debug, Clone, PartialEq)]
pub struct AssetResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn ok(asset: RenderedAsset) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), asset.kind().content_type().to_string());
        Self {
            status: 200,
            status_text: "OK".to_string(),
            headers,
            body: asset.into_bytes(),
        }
    }

    pub fn not_found(status_text: impl Into<String>) -> Self {
        Self {
            status: 404,
            status_text: status_text.into(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            headers: HashMap::new(),
            body: FAILED_BODY.as_bytes().to_vec(),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type").map(String::as_str)
    }
}

/// Resolves asset requests against a registry and renders them.
///
/// Holds no mutable state: concurrent `handle` calls are independent.
pub struct AssetResponder {
    config: Arc<AssetsConfig>,
    registry: Arc<AssetRegistry>,
    client: Client,
    vector: Arc<dyn VectorRenderer>,
    raster: Option<Arc<dyn Rasterizer>>,
}

impl AssetResponder {
    /// Create a responder with the built-in renderers.
    pub fn new(config: AssetsConfig, registry: AssetRegistry) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        #[cfg(feature = "raster")]
        let raster: Option<Arc<dyn Rasterizer>> =
            Some(Arc::new(crate::rendering::JpegRasterizer::new(config.jpeg_quality)));
        #[cfg(not(feature = "raster"))]
        let raster: Option<Arc<dyn Rasterizer>> = None;

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            client,
            vector: Arc::new(LayoutRenderer),
            raster,
        })
    }

    /// Replace the vector renderer
    pub fn with_vector_renderer(mut self, renderer: impl VectorRenderer + 'static) -> Self {
        self.vector = Arc::new(renderer);
        self
    }

    /// Replace the rasterizer
    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.raster = Some(Arc::new(rasterizer));
        self
    }

    pub fn config(&self) -> &AssetsConfig {
        &self.config
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Handle a request. Never fails: every error becomes a 404 or 500.
    pub async fn handle(&self, request: &RenderRequest) -> AssetResponse {
        let Some(kind) = OutputKind::parse(&request.output_kind) else {
            debug!("unknown output kind '{}' for '{}'", request.output_kind, request.asset_id);
            return AssetResponse::not_found("Not found");
        };

        match self.render(request, kind).await {
            Ok(asset) => {
                info!("generated {:?} for '{}'", kind, request.asset_id);
                AssetResponse::ok(asset)
            }
            Err(err) => {
                error!("failed to generate '{}' as {:?}: {}", request.asset_id, kind, err);
                if err.is_not_found() {
                    AssetResponse::not_found(err.to_string())
                } else {
                    AssetResponse::failed()
                }
            }
        }
    }

    /// Render `request` as `kind`, propagating errors.
    pub async fn render(&self, request: &RenderRequest, kind: OutputKind) -> Result<RenderedAsset> {
        let asset = self.registry.get(&request.asset_id)?;
        debug!("matched asset '{}'", asset.name());

        let ctx = RenderContext {
            params: request.route_params.clone(),
            site: self.site_origin(request).map(str::to_string),
        };
        let tree = asset.render(ctx).await?;
        let size = *asset.config();

        match kind {
            OutputKind::Debug => Ok(RenderedAsset::DebugDocument(debug_document(
                &tree,
                &size,
                &self.config.fonts,
                &self.config.theme,
                &self.config.debug_background,
            ))),
            OutputKind::Jpg => {
                let raster = self
                    .raster
                    .clone()
                    .ok_or_else(|| Error::RasterError("built without JPEG support".into()))?;
                let fonts = self.load_fonts(request).await?;
                let svg = self.vector.render(&tree, size.width, size.height, &fonts)?;
                let jpg = tokio::task::spawn_blocking(move || raster.rasterize(&svg, &fonts))
                    .await
                    .map_err(|e| Error::RasterError(format!("rasterizer task failed: {}", e)))??;
                Ok(RenderedAsset::RasterImage(jpg))
            }
            OutputKind::Svg => {
                let fonts = self.load_fonts(request).await?;
                let svg = self.vector.render(&tree, size.width, size.height, &fonts)?;
                Ok(RenderedAsset::Vector(svg))
            }
        }
    }

    fn site_origin<'a>(&'a self, request: &'a RenderRequest) -> Option<&'a str> {
        request
            .site_origin
            .as_deref()
            .or_else(|| Some(self.config.site.as_str()).filter(|s| !s.is_empty()))
    }

    fn font_source(&self, request: &RenderRequest) -> Result<ByteSource> {
        if self.config.dev {
            return Ok(ByteSource::local(&self.config.public_dir));
        }
        let origin = self
            .site_origin(request)
            .ok_or_else(|| Error::ConfigError("no site origin to fetch fonts from".into()))?;
        ByteSource::remote(self.client.clone(), origin)
    }

    async fn load_fonts(&self, request: &RenderRequest) -> Result<Vec<LoadedFont>> {
        if self.config.fonts.is_empty() {
            return Ok(Vec::new());
        }
        let source = self.font_source(request)?;
        load_fonts(&source, &self.config.fonts, Duration::from_millis(self.config.fetch_timeout_ms)).await
    }
}
