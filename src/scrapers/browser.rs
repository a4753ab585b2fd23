use crate::scrapers::error::FetchError;
use crate::scrapers::traits::Fetcher;
use crate::scrapers::types::FetchSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use reqwest::Url;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Fetcher backed by headless Chrome, for when ZonaProp answers plain
/// HTTP clients with a bot challenge instead of results.
pub struct BrowserFetcher {
    browser: Browser,
    timing: PageTiming,
}

/// How long a tab may take to load and how long it waits for scripts
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageTiming {
    timeout: Duration,
    settle: Duration,
}

impl From<&FetchSettings> for PageTiming {
    fn from(settings: &FetchSettings) -> Self {
        Self {
            timeout: settings.timeout,
            settle: settings.browser_settle,
        }
    }
}

impl BrowserFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .proxy_server(settings.proxy.as_deref())
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser,
            timing: PageTiming::from(settings),
        })
    }
}

/// Open a fresh tab, render the page in it and close it again
fn load_page(browser: &Browser, url: &str, timing: PageTiming) -> Result<String> {
    let tab = browser.new_tab()?;
    tab.set_default_timeout(timing.timeout);

    let html = render(&tab, url, timing.settle);
    if let Err(e) = tab.close(true) {
        debug!("Failed to close tab for {}: {}", url, e);
    }
    html
}

fn render(tab: &Tab, url: &str, settle: Duration) -> Result<String> {
    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;

    // Listing cards are rendered client-side after navigation completes
    thread::sleep(settle);

    let html = tab.evaluate("document.documentElement.outerHTML", false)?;
    Ok(document_html(html.value))
}

fn document_html(value: Option<serde_json::Value>) -> String {
    value
        .as_ref()
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        debug!("Opening {} in browser", url);

        let browser = self.browser.clone();
        let target = url.to_string();
        let timing = self.timing;

        let html = tokio::task::spawn_blocking(move || load_page(&browser, &target, timing))
            .await
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: format!("{:#}", e),
            })?;

        debug!("Captured {} bytes of rendered HTML", html.len());

        Ok(html)
    }

    fn backend_name(&self) -> &'static str {
        "headless-chrome"
    }
}
