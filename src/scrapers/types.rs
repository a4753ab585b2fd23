use crate::models::{ListingRecord, PropertyType, TransactionType};
use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::time::Duration;

pub const SITE_ROOT: &str = "https://www.zonaprop.com.ar";

/// Rental apartments, used when no search is given
pub const DEFAULT_SEARCH_URL: &str = "https://www.zonaprop.com.ar/departamentos-alquiler.html";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/120.0.0.0 Safari/537.36";

/// Where a scrape starts and when it stops
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// First results page
    pub base_url: Url,
    /// Property types the search covers
    pub property_types: Vec<PropertyType>,
    pub transaction_type: TransactionType,
    /// Maximum number of records, `None` for every page
    pub limit: Option<NonZeroUsize>,
}

impl SearchQuery {
    /// Build the search page URL from property types and a transaction type,
    /// e.g. `departamentos-ph-alquiler.html`.
    pub fn build(
        property_types: Vec<PropertyType>,
        transaction_type: TransactionType,
        limit: Option<NonZeroUsize>,
    ) -> Result<Self> {
        let mut property_types = property_types;
        if property_types.is_empty() {
            property_types.push(PropertyType::Apartment);
        }
        dedup_in_place(&mut property_types);

        let slugs: Vec<_> = property_types.iter().map(|t| t.slug()).collect();
        let url = format!("{}/{}-{}.html", SITE_ROOT, slugs.join("-"), transaction_type.slug());
        let base_url = Url::parse(&url).with_context(|| format!("Invalid search URL {}", url))?;

        Ok(Self {
            base_url,
            property_types,
            transaction_type,
            limit,
        })
    }

    /// Use an explicit search page. Property and transaction types missing
    /// from the arguments are read from the page slug.
    pub fn from_url(
        url: &str,
        property_types: Vec<PropertyType>,
        transaction_type: Option<TransactionType>,
        limit: Option<NonZeroUsize>,
    ) -> Result<Self> {
        let base_url = Url::parse(url).with_context(|| format!("Invalid search URL {}", url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!("Search URL must be http(s): {}", url);
        }

        let tokens = slug_tokens(&base_url);
        let transaction_type = match transaction_type {
            Some(t) => t,
            None => transaction_from_tokens(&tokens).with_context(|| {
                format!(
                    "Cannot tell sale from rental in {}, pass --transaction-type",
                    url
                )
            })?,
        };

        let mut property_types = if property_types.is_empty() {
            property_types_from_tokens(&tokens)
        } else {
            property_types
        };
        dedup_in_place(&mut property_types);

        Ok(Self {
            base_url,
            property_types,
            transaction_type,
            limit,
        })
    }

    /// Last path segment without `.html`, used to name output files
    pub fn slug(&self) -> String {
        let stem = page_stem(&self.base_url);
        if stem.is_empty() {
            "zonaprop".to_string()
        } else {
            stem
        }
    }

    pub fn limit_reached(&self, count: usize) -> bool {
        self.limit.map_or(false, |limit| count >= limit.get())
    }

    /// The property type every listing of this search has, if there is only one
    pub fn single_property_type(&self) -> Option<PropertyType> {
        match self.property_types.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_SEARCH_URL).expect("default search URL is valid"),
            property_types: vec![PropertyType::Apartment],
            transaction_type: TransactionType::Rental,
            limit: None,
        }
    }
}

fn dedup_in_place(types: &mut Vec<PropertyType>) {
    let mut seen = Vec::with_capacity(types.len());
    types.retain(|t| {
        if seen.contains(t) {
            false
        } else {
            seen.push(*t);
            true
        }
    });
}

fn page_stem(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.trim_end_matches(".html").to_string())
        .unwrap_or_default()
}

/// Hyphen-separated words of the page name, page suffix removed
fn slug_tokens(url: &Url) -> Vec<String> {
    let stem = page_stem(url);
    let stem = match stem.find("-pagina-") {
        Some(pos) => &stem[..pos],
        None => stem.as_str(),
    };
    stem.split('-').map(|s| s.to_ascii_lowercase()).collect()
}

fn transaction_from_tokens(tokens: &[String]) -> Option<TransactionType> {
    tokens.iter().find_map(|t| t.parse().ok())
}

fn property_types_from_tokens(tokens: &[String]) -> Vec<PropertyType> {
    let mut types = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == "locales" && tokens.get(i + 1).map(String::as_str) == Some("comerciales") {
            types.push(PropertyType::Commercial);
            i += 2;
            continue;
        }
        if let Some(t) = PropertyType::from_slug(&tokens[i]) {
            types.push(t);
        }
        i += 1;
    }
    types
}

/// What to do with a results page the ruleset cannot read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ParseErrorPolicy {
    /// Stop the run with a parse error
    #[default]
    Abort,
    /// Log the page, follow its next link if it has one
    Skip,
}

/// HTTP and browser settings for the fetch backends
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    pub timeout: Duration,
    /// Proxy URL, e.g. an egress point inside Argentina
    pub proxy: Option<String>,
    /// How long the browser backend waits for scripts after navigation
    pub browser_settle: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            proxy: None,
            browser_settle: Duration::from_secs(3),
        }
    }
}

/// Pipeline behavior that does not change what is searched
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Pause between consecutive page requests
    pub delay: Duration,
    pub on_parse_error: ParseErrorPolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            on_parse_error: ParseErrorPolicy::Abort,
        }
    }
}

/// A listing field that could not be located on a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFieldWarning {
    pub field: &'static str,
    pub listing_url: String,
}

/// Everything extracted from one results page
#[derive(Debug, Default)]
pub struct PageResult {
    pub records: Vec<ListingRecord>,
    pub next_page: Option<Url>,
    /// Listing blocks without a URL
    pub dropped: usize,
    pub warnings: Vec<MissingFieldWarning>,
    /// Result count advertised in the page heading
    pub total_results: Option<u64>,
}

/// Counters logged at the end of a run
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStats {
    pub pages_fetched: usize,
    pub skipped_pages: Vec<usize>,
    pub dropped_without_url: usize,
    pub duplicates: usize,
    pub missing_fields: std::collections::BTreeMap<&'static str, usize>,
    pub total_results: Option<u64>,
}
