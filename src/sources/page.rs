use crate::{MapError, Result};
use reqwest::Url;

/// The page URL the viewer was opened with.
///
/// Two inputs ride on it: waypoints GeoJSON in the fragment
/// (`#%7B%22type%22...`) and a gist to load them from (`?gistId=...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn parse(location: &str) -> Result<Self> {
        let url = Url::parse(location)
            .map_err(|e| MapError::Config(format!("bad page location '{}': {}", location, e)))?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fragment without the leading `#`, still URI-encoded; `None` when empty
    pub fn waypoints(&self) -> Option<&str> {
        self.url.fragment().filter(|fragment| !fragment.is_empty())
    }

    /// First `gistId` query value, if present and non-empty
    pub fn gist_id(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == "gistId")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    /// Base URL for relative asset paths: the page URL minus query and fragment
    pub fn asset_base(&self) -> Url {
        let mut base = self.url.clone();
        base.set_query(None);
        base.set_fragment(None);
        base
    }
}

impl std::str::FromStr for PageLocation {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_page() {
        let page = PageLocation::parse("https://bitcraftmap.com/").unwrap();
        assert_eq!(page.waypoints(), None);
        assert_eq!(page.gist_id(), None);
    }

    #[test]
    fn test_fragment_is_kept_encoded() {
        let page = PageLocation::parse(
            "https://bitcraftmap.com/#%7B%22type%22%3A%22FeatureCollection%22%7D",
        )
        .unwrap();
        assert_eq!(
            page.waypoints(),
            Some("%7B%22type%22%3A%22FeatureCollection%22%7D")
        );
        assert!(PageLocation::parse("https://bitcraftmap.com/#")
            .unwrap()
            .waypoints()
            .is_none());
    }

    #[test]
    fn test_gist_id_query() {
        let page: PageLocation = "https://bitcraftmap.com/?foo=1&gistId=0123456789abcdef0123456789abcdef"
            .parse()
            .unwrap();
        assert_eq!(
            page.gist_id().as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert!(PageLocation::parse("https://bitcraftmap.com/?gistId=")
            .unwrap()
            .gist_id()
            .is_none());
    }

    #[test]
    fn test_asset_base() {
        let page = PageLocation::parse("https://example.org/map/index.html?gistId=x#abc").unwrap();
        let base = page.asset_base();
        assert_eq!(base.as_str(), "https://example.org/map/index.html");
        assert_eq!(
            base.join("assets/markers/trees.geojson").unwrap().as_str(),
            "https://example.org/map/assets/markers/trees.geojson"
        );
    }

    #[test]
    fn test_rejects_relative() {
        assert!(matches!(
            PageLocation::parse("index.html"),
            Err(MapError::Config(_))
        ));
    }
}
