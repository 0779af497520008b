use anyhow::Result;
use async_trait::async_trait;

/// One outbound reference discovered on a page: an `<a href>` or an inline
/// image. `anchor` is the visible link text, or the image alt text.
#[derive(Debug, Clone)]
pub struct OutboundLink {
    pub url: String,
    pub anchor: String,
}

/// Everything the engine needs from one fetched page. Anchor links come
/// before image references, each group in document order.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub title: String,
    pub links: Vec<OutboundLink>,
    pub body: String,
}

/// Boundary between the engine and the network. Graph construction, ranking
/// and indexing only ever see this trait, so they run against in-memory
/// fixtures in tests.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Title, outbound links and body text for a canonical URL.
    async fn fetch(&self, url: &str) -> Result<PageContent>;

    /// Body text only; used for result snippets.
    async fn fetch_body(&self, url: &str) -> Result<String>;
}
