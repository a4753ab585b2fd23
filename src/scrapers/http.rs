use crate::scrapers::error::FetchError;
use crate::scrapers::traits::Fetcher;
use crate::scrapers::types::FetchSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy, Url};
use tracing::{debug, warn};

/// Plain HTTP fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("es-AR,es;q=0.9"));

        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers);

        if let Some(proxy) = &settings.proxy {
            let proxy = Proxy::all(proxy.as_str())
                .with_context(|| format!("Invalid proxy URL {}", proxy))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("ZonaProp returned status: {}", status);
            return Err(FetchError::from_status(url.as_str(), status.as_u16()));
        }

        let html = response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: format!("failed to read response body: {}", e),
        })?;

        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
