use crate::scrapers::error::FetchError;
use async_trait::async_trait;
use reqwest::Url;

/// Retrieves the raw HTML of one results page.
/// Implemented by the plain HTTP client and the headless browser.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;

    /// Name of the backend, for logs
    fn backend_name(&self) -> &'static str;
}
