//! Catalog search - turns a text query into an ordered list of tracks
//!
//! - `youtube`: YouTube Data API v3 implementation

mod youtube;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Track;

pub use youtube::{YouTubeSearch, YOUTUBE_SEARCH_URL};

/// A remote catalog that can be searched for tracks.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Return tracks in the catalog's relevance order.
    ///
    /// Fails with [`crate::Error::SearchFailed`] when the upstream call errors.
    async fn search(&self, query: &str) -> Result<Vec<Track>>;
}

/// Run a search the way a view does: blank queries never reach the backend and
/// a failed search shows up as an empty result list.
pub async fn search_or_empty(catalog: &dyn CatalogSearch, query: &str) -> Vec<Track> {
    let query = query.trim();
    if query.is_empty() {
        tracing::debug!("Ignoring empty search query");
        return Vec::new();
    }

    let result = catalog.search(query).await;
    crate::log_api_result!("search", result);
    match result {
        Ok(tracks) => {
            tracing::info!(query, count = tracks.len(), "Search completed");
            tracks
        }
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::Mutex;

    struct FakeCatalog {
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeCatalog {
        fn new(fail: bool) -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl CatalogSearch for FakeCatalog {
        async fn search(&self, query: &str) -> Result<Vec<Track>> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(Error::search("upstream returned 403"));
            }
            Ok(vec![
                Track::new("a", "First", "Chan", ""),
                Track::new("b", "Second", "Chan", ""),
            ])
        }
    }

    #[tokio::test]
    async fn blank_query_is_not_sent() {
        let catalog = FakeCatalog::new(false);

        assert!(search_or_empty(&catalog, "   ").await.is_empty());
        assert!(catalog.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_is_trimmed_before_searching() {
        let catalog = FakeCatalog::new(false);

        let tracks = search_or_empty(&catalog, "  lofi beats ").await;

        assert_eq!(tracks.len(), 2);
        assert_eq!(*catalog.queries.lock().unwrap(), vec!["lofi beats".to_string()]);
    }

    #[tokio::test]
    async fn failed_search_yields_empty_results() {
        let catalog = FakeCatalog::new(true);

        assert!(search_or_empty(&catalog, "anything").await.is_empty());
        assert_eq!(catalog.queries.lock().unwrap().len(), 1);
    }
}
