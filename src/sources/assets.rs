//! Startup loading of static marker files and user waypoints.
//!
//! Fetches run as futures polled together on the caller's task. Each
//! result is applied to the [`Map`] as it completes, so the map is only
//! ever touched from one place and needs no locking.

use crate::{
    core::{config::MapOptions, constants::WAYPOINTS_LAYER, map::Map},
    data::{
        poi::PoiCategory,
        renderer::{FeatureRenderer, RenderReport},
        validate::validate,
    },
    sources::{gist::GistClient, page::PageLocation},
    MapError, Result,
};
use async_trait::async_trait;
use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Url;

/// Shared async HTTP client; the GitHub API rejects requests without a user agent
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("bitcraft-map/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to a default http client: {}", e);
            reqwest::Client::new()
        })
});

/// Anything that can turn a path or URL into text
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, path: &str) -> Result<String>;
}

/// Fetches over HTTP. Relative paths resolve against `base`; absolute
/// URLs are used as they are.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| MapError::Config(format!("cannot resolve '{}': {}", path, e)))
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.resolve(path)?;
        log::debug!("GET {}", url);
        let response = HTTP_CLIENT.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Reads assets from a local directory
#[cfg(feature = "tokio-runtime")]
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: std::path::PathBuf,
}

#[cfg(feature = "tokio-runtime")]
impl DirFetcher {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait]
impl TextFetcher for DirFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let path = self.root.join(path);
        log::debug!("reading {}", path.display());
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// What a load pass did, source by source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Source name and number of primitives drawn from it
    pub loaded: Vec<(String, usize)>,
    /// Sources that failed; their layers stay as they were
    pub failed: Vec<String>,
}

impl LoadSummary {
    fn record(&mut self, source: String, outcome: Result<usize>) {
        match outcome {
            Ok(count) => self.loaded.push((source, count)),
            Err(e) => {
                log::error!("failed to load {}: {}", source, e);
                self.failed.push(source);
            }
        }
    }

    pub fn primitives(&self) -> usize {
        self.loaded.iter().map(|(_, count)| count).sum()
    }
}

enum Fetched {
    Poi(PoiCategory, Result<String>),
    Gist(Result<String>),
}

/// Loads everything the page shows at startup
pub struct AssetLoader<F> {
    fetcher: F,
    markers_path: String,
    gist: GistClient,
}

impl<F: TextFetcher> AssetLoader<F> {
    pub fn new(fetcher: F, options: &MapOptions) -> Self {
        Self {
            fetcher,
            markers_path: options.markers_path.clone(),
            gist: GistClient::default(),
        }
    }

    pub fn with_gist_client(mut self, gist: GistClient) -> Self {
        self.gist = gist;
        self
    }

    pub fn poi_path(&self, category: PoiCategory) -> String {
        format!("{}{}", self.markers_path, category.file_name())
    }

    /// Waypoints from the page fragment, drawn and shown right away.
    ///
    /// `None` when there is no fragment or it fails validation.
    pub fn load_hash(&self, map: &mut Map, page: &PageLocation) -> Option<RenderReport> {
        let fragment = page.waypoints()?;
        match apply_waypoints(map, fragment) {
            Ok(report) => Some(report),
            Err(e) => {
                log::warn!("ignoring waypoints from the page hash: {}", e);
                None
            }
        }
    }

    /// Waypoints from the gist named in the page query
    pub async fn load_gist(&self, map: &mut Map, page: &PageLocation) -> Option<RenderReport> {
        let gist_id = page.gist_id()?;
        let text = self.gist.latest_raw(&self.fetcher, &gist_id).await;
        match text.and_then(|text| apply_waypoints(map, &text)) {
            Ok(report) => Some(report),
            Err(e) => {
                log::error!("failed to load gist {}: {}", gist_id, e);
                None
            }
        }
    }

    /// All static marker files, fetched concurrently
    pub async fn load_pois(&self, map: &mut Map) -> LoadSummary {
        let pending: FuturesUnordered<_> =
            PoiCategory::ALL.into_iter().map(|category| self.fetch_poi(category)).collect();
        self.drain(map, pending).await
    }

    /// The full startup sequence: hash waypoints first, then the gist and
    /// all marker files concurrently, applied in completion order.
    pub async fn load_page(&self, map: &mut Map, page: &PageLocation) -> LoadSummary {
        let pending = FuturesUnordered::new();
        if let Some(gist_id) = page.gist_id() {
            pending.push(
                async move { Fetched::Gist(self.gist.latest_raw(&self.fetcher, &gist_id).await) }
                    .boxed(),
            );
        }
        for category in PoiCategory::ALL {
            pending.push(self.fetch_poi(category));
        }

        let hash = self.load_hash(map, page);
        let mut summary = self.drain(map, pending).await;
        if let Some(report) = hash {
            summary.loaded.insert(0, ("hash".to_string(), report.primitives.len()));
        } else if page.waypoints().is_some() {
            summary.failed.insert(0, "hash".to_string());
        }

        log::info!(
            "startup load done: {} primitives from {} sources, {} failed",
            summary.primitives(),
            summary.loaded.len(),
            summary.failed.len()
        );
        summary
    }

    fn fetch_poi(&self, category: PoiCategory) -> BoxFuture<'_, Fetched> {
        let path = self.poi_path(category);
        async move { Fetched::Poi(category, self.fetcher.fetch_text(&path).await) }.boxed()
    }

    async fn drain(
        &self,
        map: &mut Map,
        mut pending: FuturesUnordered<BoxFuture<'_, Fetched>>,
    ) -> LoadSummary {
        let mut summary = LoadSummary::default();
        while let Some(fetched) = pending.next().await {
            match fetched {
                Fetched::Poi(category, text) => {
                    let outcome = text.and_then(|text| category.load(map, &text));
                    summary.record(category.to_string(), outcome);
                }
                Fetched::Gist(text) => {
                    let outcome = text
                        .and_then(|text| apply_waypoints(map, &text))
                        .map(|report| report.primitives.len());
                    summary.record("gist".to_string(), outcome);
                }
            }
        }
        summary
    }
}

/// Validates user text and draws it into the waypoints layer, shown
pub fn apply_waypoints(map: &mut Map, untrusted: &str) -> Result<RenderReport> {
    let collection = validate(untrusted, map.icons())?;
    Ok(FeatureRenderer::new().render_into(map, &collection, WAYPOINTS_LAYER, true))
}
