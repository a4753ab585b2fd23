use crate::models::ListingRecord;
use crate::scrapers::error::{FetchError, ScrapeError};
use crate::scrapers::traits::Fetcher;
use crate::scrapers::types::{ParseErrorPolicy, RunSettings, RunStats, SearchQuery};
use crate::scrapers::zonaprop;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Records of a finished run and how they were obtained
#[derive(Debug, Default)]
pub struct RunOutput {
    pub records: Vec<ListingRecord>,
    pub stats: RunStats,
}

/// Walks the results pages of one search, one page at a time
pub struct Pipeline {
    fetcher: Box<dyn Fetcher>,
    settings: RunSettings,
}

impl Pipeline {
    pub fn new(fetcher: Box<dyn Fetcher>, settings: RunSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Fetch and extract pages until the limit is reached or there is no
    /// next page. Any fetch failure ends the run.
    pub async fn run(&self, query: &SearchQuery) -> Result<RunOutput, ScrapeError> {
        info!(
            "Starting {} scrape of {} (limit: {})",
            self.fetcher.backend_name(),
            query.base_url,
            query.limit.map_or_else(|| "none".to_string(), |l| l.to_string())
        );

        let mut output = RunOutput::default();
        let mut seen_urls = HashSet::new();
        let mut visited = HashSet::new();
        let mut next = Some(query.base_url.clone());
        let mut page = 0;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                warn!("Next-page link points back to {}, stopping", url);
                break;
            }

            page += 1;
            if page > 1 && !self.settings.delay.is_zero() {
                tokio::time::sleep(self.settings.delay).await;
            }

            debug!("Fetching page {}: {}", page, url);
            let html = self
                .fetcher
                .fetch(&url)
                .await
                .map_err(|source| ScrapeError::Fetch { page, source })?;
            if html.trim().is_empty() || zonaprop::is_blank_document(&html) {
                return Err(ScrapeError::Fetch {
                    page,
                    source: FetchError::Empty { url: url.to_string() },
                });
            }
            output.stats.pages_fetched += 1;

            let result = match zonaprop::parse_page(&html, &url, query) {
                Ok(result) => result,
                Err(source) => match self.settings.on_parse_error {
                    ParseErrorPolicy::Abort => return Err(ScrapeError::Parse { page, source }),
                    ParseErrorPolicy::Skip => {
                        warn!("Skipping page {}: {}", page, source);
                        output.stats.skipped_pages.push(page);
                        next = zonaprop::next_page_link(&html, &url).ok().flatten();
                        continue;
                    }
                },
            };

            if output.stats.total_results.is_none() {
                if let Some(total) = result.total_results {
                    info!("Site reports {} results for this search", total);
                    output.stats.total_results = Some(total);
                }
            }
            output.stats.dropped_without_url += result.dropped;
            for warning in &result.warnings {
                debug!("Listing {} has no {}", warning.listing_url, warning.field);
                *output.stats.missing_fields.entry(warning.field).or_default() += 1;
            }

            let found = result.records.len();
            for record in result.records {
                if query.limit_reached(output.records.len()) {
                    break;
                }
                if !seen_urls.insert(record.url.clone()) {
                    debug!("Duplicate listing {}", record.url);
                    output.stats.duplicates += 1;
                    continue;
                }
                output.records.push(record);
            }

            info!(
                "Page {}: {} listings, {} collected so far",
                page,
                found,
                output.records.len()
            );

            if query.limit_reached(output.records.len()) {
                info!("Reached limit of {} records", output.records.len());
                break;
            }

            next = result.next_page;
            if next.is_none() {
                info!("No next page after page {}", page);
            }
        }

        Ok(output)
    }
}
