//! Asset definitions and their lookup

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use log::debug;
use serde::Deserialize;

use crate::tree::Node;
use crate::{AssetImageConfig, Error, Result};

/// What a render function gets to work with
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Route parameters of the incoming request (including `__image`/`__type`)
    pub params: HashMap<String, String>,
    /// Site origin, when known
    pub site: Option<String>,
}

impl RenderContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Future returned by a render function
pub type RenderFuture = BoxFuture<'static, Result<Node>>;

type RenderFn = Arc<dyn Fn(RenderContext) -> RenderFuture + Send + Sync>;

/// A named render function plus its output size
#[derive(Clone)]
pub struct AssetDefinition {
    name: String,
    render: RenderFn,
    config: AssetImageConfig,
}

impl AssetDefinition {
    /// Define an asset. `path` is the module path that declares it; the
    /// asset is served under [`derive_asset_name`] of that path.
    ///
    /// The render function is async so it can fetch images or data before
    /// building its tree.
    pub fn new<F, Fut>(path: &str, config: AssetImageConfig, render: F) -> Self
    where
        F: Fn(RenderContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node>> + Send + 'static,
    {
        Self {
            name: derive_asset_name(path),
            render: Arc::new(move |ctx| render(ctx).boxed()),
            config,
        }
    }

    /// Define an asset whose render function does no I/O.
    pub fn new_sync<F>(path: &str, config: AssetImageConfig, render: F) -> Self
    where
        F: Fn(&RenderContext) -> Result<Node> + Send + Sync + 'static,
    {
        Self::new(path, config, move |ctx| future::ready(render(&ctx)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AssetImageConfig {
        &self.config
    }

    pub async fn render(&self, ctx: RenderContext) -> Result<Node> {
        (self.render)(ctx).await
    }
}

impl fmt::Debug for AssetDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetDefinition")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Derive the public asset name from the path of the file declaring it:
/// the last path segment, minus its extension, minus one leading `_`.
///
/// ```
/// use dynamic_assets::derive_asset_name;
/// assert_eq!(derive_asset_name("src/pages/og/_Foo.tsx"), "Foo");
/// assert_eq!(derive_asset_name("Bar.tsx"), "Bar");
/// ```
pub fn derive_asset_name(path: &str) -> String {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let stem = match file.rfind('.') {
        Some(idx) if idx > 0 => &file[..idx],
        _ => file,
    };
    stem.strip_prefix('_').unwrap_or(stem).to_string()
}

/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, AssetDefinition>,
}

/// On-disk form of a declarative asset
#[derive(Debug, Deserialize)]
struct AssetFile {
    config: AssetImageConfig,
    tree: Node,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset. Two assets deriving the same name are a configuration
    /// error rather than an arbitrary pick at request time.
    pub fn register(&mut self, asset: AssetDefinition) -> Result<()> {
        if self.assets.contains_key(asset.name()) {
            return Err(Error::DuplicateAsset(asset.name.clone()));
        }
        debug!("registered asset '{}' ({}x{})", asset.name, asset.config.width, asset.config.height);
        self.assets.insert(asset.name.clone(), asset);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&AssetDefinition> {
        self.assets.get(name).ok_or_else(Error::not_found)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.assets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Register every `*.json` file in `dir` as a declarative asset. The
    /// file holds `{ "config": {...}, "tree": {...} }`; `{{param}}`
    /// placeholders in the tree are filled from the request at render time.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut registry = Self::new();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let raw = std::fs::read_to_string(&path)?;
            let file: AssetFile = serde_json::from_str(&raw).map_err(|e| {
                Error::ConfigError(format!("{}: {}", path.display(), e))
            })?;
            if file.config.width == 0 || file.config.height == 0 {
                return Err(Error::ConfigError(format!(
                    "{}: width and height must be non-zero",
                    path.display()
                )));
            }
            let tree = file.tree;
            let asset = AssetDefinition::new_sync(&path.to_string_lossy(), file.config, move |ctx| {
                Ok(tree.substitute(ctx))
            });
            registry.register(asset)?;
        }
        Ok(registry)
    }
}
