use anyhow::Context;
use async_trait::async_trait;
use bitcraft_map::{
    prelude::*,
    sources::assets::{DirFetcher, HttpFetcher},
};

/// Reads relative asset paths from disk and sends absolute URLs (the gist
/// API) over HTTP
struct LocalAssets {
    dir: DirFetcher,
    http: HttpFetcher,
}

#[async_trait]
impl TextFetcher for LocalAssets {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        if path.contains("://") {
            self.http.fetch_text(path).await
        } else {
            self.dir.fetch_text(path).await
        }
    }
}

fn usage() -> anyhow::Error {
    anyhow::anyhow!("usage: bitcraft-map-app <page-url> [asset-dir] [options.json]")
}

/// Loads a page the way the viewer does at startup and prints what ended up
/// on the map
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let page = args.next().ok_or_else(usage)?;
    let asset_dir = args.next();
    let options = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading options from {}", path))?;
            MapOptions::from_json_str(&json)?
        }
        None => MapOptions::default(),
    };

    let page = PageLocation::parse(&page)?;
    let mut map = Map::new(options.clone());
    let http = HttpFetcher::new(page.asset_base());

    let summary = match asset_dir {
        Some(dir) => {
            let fetcher = LocalAssets {
                dir: DirFetcher::new(dir),
                http,
            };
            AssetLoader::new(fetcher, &options)
                .load_page(&mut map, &page)
                .await
        }
        None => AssetLoader::new(http, &options).load_page(&mut map, &page).await,
    };

    for (source, count) in &summary.loaded {
        println!("{:>14}: {}", source, count);
    }
    for source in &summary.failed {
        println!("{:>14}: failed", source);
    }

    let controls = LayerControls::default();
    let checked: Vec<&str> = controls
        .states(&map)
        .into_iter()
        .filter(|(_, checked)| *checked)
        .map(|(label, _)| label)
        .collect();
    println!("visible: {}", checked.join(", "));
    println!(
        "{} primitives, {} on screen",
        map.primitive_count(),
        map.visible_primitives().len()
    );
    if let Some(camera) = map.camera() {
        println!("camera: {}", serde_json::to_string(camera)?);
    }

    if !summary.failed.is_empty() {
        log::warn!("{} sources failed to load", summary.failed.len());
    }
    Ok(())
}
