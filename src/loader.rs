//! Reading fonts and images from disk or over HTTP
//!
//! Development builds read straight from the local filesystem; deployed
//! builds fetch relative to the site origin. Every read is bounded by a
//! timeout so a stalled fetch fails the render instead of hanging it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::future::try_join_all;
use log::debug;
use reqwest::Client;
use url::Url;

use crate::{Error, FontSpec, FontStyle, Result};

/// Where bytes come from
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Paths are resolved against `root`
    Local { root: PathBuf },
    /// Locations are joined onto `origin` and fetched with GET
    Remote { client: Client, origin: Url },
}

/// A font ready to hand to a renderer
#[derive(Debug, Clone)]
pub struct LoadedFont {
    pub name: String,
    pub style: FontStyle,
    pub weight: u16,
    pub data: Vec<u8>,
}

impl ByteSource {
    pub fn local(root: impl Into<PathBuf>) -> Self {
        ByteSource::Local { root: root.into() }
    }

    pub fn remote(client: Client, origin: &str) -> Result<Self> {
        let origin = Url::parse(origin)
            .map_err(|e| Error::ConfigError(format!("invalid origin '{}': {}", origin, e)))?;
        Ok(ByteSource::Remote { client, origin })
    }

    /// Read `location`, failing with [`Error::Timeout`] once `timeout` elapses.
    pub async fn read(&self, location: &str, timeout: Duration) -> Result<Vec<u8>> {
        match tokio::time::timeout(timeout, self.read_unbounded(location)).await {
            Ok(res) => res,
            Err(_) => Err(Error::Timeout(timeout.as_millis() as u64)),
        }
    }

    async fn read_unbounded(&self, location: &str) -> Result<Vec<u8>> {
        match self {
            ByteSource::Local { root } => {
                let path = local_path(root, location);
                debug!("reading {}", path.display());
                Ok(tokio::fs::read(&path).await?)
            }
            ByteSource::Remote { client, origin } => {
                let url = origin
                    .join(location)
                    .map_err(|e| Error::NetworkError(format!("cannot resolve '{}': {}", location, e)))?;
                debug!("fetching {}", url);
                let res = client.get(url.clone()).send().await?;
                let status = res.status();
                if !status.is_success() {
                    return Err(Error::FetchError {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(res.bytes().await?.to_vec())
            }
        }
    }
}

/// With an empty root the location is a plain filesystem path. Otherwise
/// site-rooted URLs such as `/fonts/Inter.ttf` land under `root`.
fn local_path(root: &Path, location: &str) -> PathBuf {
    if root.as_os_str().is_empty() {
        return PathBuf::from(location);
    }
    root.join(location.trim_start_matches('/'))
}

/// Load every configured font concurrently. The first failure aborts the
/// whole set.
pub async fn load_fonts(source: &ByteSource, fonts: &[FontSpec], timeout: Duration) -> Result<Vec<LoadedFont>> {
    try_join_all(fonts.iter().map(|font| async move {
        let data = source.read(&font.url, timeout).await.map_err(|e| Error::FontLoadError {
            url: font.url.clone(),
            source: Box::new(e),
        })?;
        debug!("loaded font '{}' ({} bytes)", font.name, data.len());
        Ok::<_, Error>(LoadedFont {
            name: font.name.clone(),
            style: font.style,
            weight: font.weight,
            data,
        })
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(url: &str) -> FontSpec {
        FontSpec { name: "Inter".into(), url: url.into(), style: FontStyle::Normal, weight: 400 }
    }

    #[test]
    fn local_path_maps_site_rooted_urls_under_root() {
        let root = Path::new("public");
        assert_eq!(local_path(root, "/fonts/a.ttf"), PathBuf::from("public/fonts/a.ttf"));
        assert_eq!(local_path(root, "fonts/a.ttf"), PathBuf::from("public/fonts/a.ttf"));
        assert_eq!(local_path(Path::new(""), "/tmp/x.png"), PathBuf::from("/tmp/x.png"));
    }

    #[tokio::test]
    async fn loads_fonts_from_local_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("fonts")).unwrap();
        std::fs::write(dir.path().join("fonts/Inter.ttf"), b"font-bytes").unwrap();

        let source = ByteSource::local(dir.path());
        let fonts = load_fonts(&source, &[font("/fonts/Inter.ttf")], Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].data, b"font-bytes");
        assert_eq!(fonts[0].weight, 400);
    }

    #[tokio::test]
    async fn missing_local_font_is_font_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ByteSource::local(dir.path());
        let err = load_fonts(&source, &[font("/fonts/Missing.ttf")], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FontLoadError { ref url, .. } if url == "/fonts/Missing.ttf"));
    }

    #[test]
    fn remote_requires_absolute_origin() {
        assert!(ByteSource::remote(Client::new(), "not a url").is_err());
        assert!(ByteSource::remote(Client::new(), "https://example.com").is_ok());
    }
}
