//! Static image references
//!
//! Framework image imports arrive as metadata whose `src` is either a dev
//! server path (`/@fs/abs/path/cover.png?origWidth=...`) or a deployable URL.
//! [`ImageResolver`] reads the bytes behind such a reference so an asset can
//! inline them as a data URI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::loader::ByteSource;
use crate::{AssetsConfig, Error, Result};

/// Already-processed image metadata as handed out by the framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub src: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub format: Option<String>,
}

impl ImageMetadata {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: 0,
            height: 0,
            format: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Detect the kind from the extension of `src`, ignoring any query string.
    pub fn from_src(src: &str) -> Result<Self> {
        let path = strip_query(src);
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => Ok(ImageKind::Jpeg),
            Some("png") => Ok(ImageKind::Png),
            _ => Err(Error::UnsupportedFormatError(src.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
        }
    }
}

/// Image bytes with the kind derived from the reference
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
}

/// Encode bytes as `data:image/<kind>;base64,<payload>`.
///
/// ```
/// use dynamic_assets::image_ref::{image_buffer_to_base64, ImageKind};
/// assert_eq!(image_buffer_to_base64(b"hi", ImageKind::Png), "data:image/png;base64,aGk=");
/// ```
pub fn image_buffer_to_base64(bytes: &[u8], kind: ImageKind) -> String {
    format!("data:image/{};base64,{}", kind.as_str(), STANDARD.encode(bytes))
}

fn strip_query(src: &str) -> &str {
    src.split_once('?').map_or(src, |(path, _)| path)
}

/// Where the bytes of `image` live. In development the dev-server path is
/// mapped back to an absolute local path; otherwise `src` is used as is.
pub fn image_path(image: &ImageMetadata, dev: bool) -> String {
    if !dev {
        return image.src.clone();
    }
    let local = strip_query(&image.src).replacen("/@fs", "", 1);
    let path = PathBuf::from(&local);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
    };
    absolute.to_string_lossy().into_owned()
}

/// Reads static images the way the configuration says: from disk when
/// developing or building statically, over HTTP from the site otherwise.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    dev: bool,
    source: ByteSource,
    timeout: Duration,
}

impl ImageResolver {
    pub fn new(config: &AssetsConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.fetch_timeout_ms);
        let source = if config.dev || !config.ssr {
            ByteSource::local("")
        } else {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
            ByteSource::remote(client, &config.site)?
        };
        Ok(Self {
            dev: config.dev,
            source,
            timeout,
        })
    }

    /// Read the image bytes. The extension is checked before any I/O.
    pub async fn buffer(&self, image: &ImageMetadata) -> Result<ImageBuffer> {
        let kind = ImageKind::from_src(&image.src)?;
        let location = image_path(image, self.dev);
        let bytes = self.source.read(&location, self.timeout).await?;
        Ok(ImageBuffer { bytes, kind })
    }

    /// Read the image and encode it as a data URI.
    pub async fn base64(&self, image: &ImageMetadata) -> Result<String> {
        let ImageBuffer { bytes, kind } = self.buffer(image).await?;
        Ok(image_buffer_to_base64(&bytes, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(ImageKind::from_src("/a/b.jpg").unwrap(), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_src("/a/b.JPEG").unwrap(), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_src("/@fs/x/cover.png?origWidth=10").unwrap(), ImageKind::Png);
        assert!(matches!(ImageKind::from_src("/a/b.webp"), Err(Error::UnsupportedFormatError(_))));
        assert!(matches!(ImageKind::from_src("/a/noext"), Err(Error::UnsupportedFormatError(_))));
    }

    #[test]
    fn data_uri_round_trips() {
        let bytes: Vec<u8> = (0..=255).collect();
        let uri = image_buffer_to_base64(&bytes, ImageKind::Png);
        let payload = uri.strip_prefix("data:image/png;base64,").expect("prefix");
        assert_eq!(STANDARD.decode(payload).unwrap(), bytes);
    }

    #[test]
    fn dev_path_strips_fs_prefix_and_query() {
        let image = ImageMetadata::new("/@fs/home/me/site/src/cover.png?origWidth=800&origFormat=png");
        assert_eq!(image_path(&image, true), "/home/me/site/src/cover.png");
        assert_eq!(image_path(&image, false), image.src);

        let relative = image_path(&ImageMetadata::new("src/cover.png"), true);
        assert!(Path::new(&relative).is_absolute());
        assert!(relative.ends_with("src/cover.png"));
    }

    #[tokio::test]
    async fn unsupported_extension_fails_before_reading() {
        let config = AssetsConfig { dev: true, ..Default::default() };
        let resolver = ImageResolver::new(&config).unwrap();
        let err = resolver.buffer(&ImageMetadata::new("/does/not/exist.gif")).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormatError(_)));
    }

    #[tokio::test]
    async fn reads_local_image_as_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("logo.png");
        std::fs::write(&file, [0x89, b'P', b'N', b'G']).unwrap();

        let config = AssetsConfig { dev: true, ..Default::default() };
        let resolver = ImageResolver::new(&config).unwrap();
        let image = ImageMetadata::new(format!("/@fs{}?v=1", file.display()));
        let uri = resolver.base64(&image).await.unwrap();
        assert_eq!(uri, image_buffer_to_base64(&[0x89, b'P', b'N', b'G'], ImageKind::Png));
    }
}
