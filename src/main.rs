use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dynamic_assets::image_ref::{ImageMetadata, ImageResolver};
use dynamic_assets::{AssetRegistry, AssetResponder, AssetsConfig, RenderRequest};

#[derive(Parser)]
#[command(name = "dynamic-assets", about = "Render OG images and social cards from declarative assets")]
struct Cli {
    /// Plugin configuration (JSON)
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the assets declared in a directory
    List {
        #[arg(long, default_value = "assets")]
        assets: PathBuf,
    },
    /// Render one asset as svg, jpg or debug
    Render {
        #[arg(long, default_value = "assets")]
        assets: PathBuf,
        asset: String,
        kind: String,
        /// Route parameter passed to the asset, as key=value
        #[arg(long = "param", short = 'p', value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Write the body here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Print a static image as a data URI
    DataUri { src: String },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AssetsConfig> {
    match path {
        Some(path) => AssetsConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AssetsConfig { dev: true, ..Default::default() }),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::List { assets } => {
            let registry = AssetRegistry::load_dir(&assets)
                .with_context(|| format!("loading assets from {}", assets.display()))?;
            for name in registry.names() {
                let cfg = registry.get(name)?.config();
                println!("{}\t{}x{}", name, cfg.width, cfg.height);
            }
        }
        Command::Render { assets, asset, kind, params, out } => {
            let registry = AssetRegistry::load_dir(&assets)
                .with_context(|| format!("loading assets from {}", assets.display()))?;
            let responder = AssetResponder::new(config, registry)?;

            let mut route_params: HashMap<String, String> = params.into_iter().collect();
            route_params.insert("__image".into(), asset);
            route_params.insert("__type".into(), kind);
            let request = RenderRequest::from_route_params(route_params, None);

            let response = responder.handle(&request).await;
            if response.status != 200 {
                bail!(
                    "{} {}: {}",
                    response.status,
                    response.status_text,
                    String::from_utf8_lossy(&response.body)
                );
            }
            match out {
                Some(path) => std::fs::write(&path, &response.body)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&response.body)?;
                }
            }
        }
        Command::DataUri { src } => {
            let resolver = ImageResolver::new(&config)?;
            println!("{}", resolver.base64(&ImageMetadata::new(src)).await?);
        }
    }
    Ok(())
}
