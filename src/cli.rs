use crate::models::{PropertyType, TransactionType};
use crate::scrapers::{FetchSettings, ParseErrorPolicy, RunSettings, SearchQuery};
use anyhow::Result;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "ZonaProp listing scraper")]
pub struct Args {
    /// Search results page to start from (default: rental apartments)
    #[arg(long)]
    pub url: Option<String>,

    /// Property types: departamentos, casas, terrenos, locales-comerciales, ph
    #[arg(short = 'p', long, num_args = 1..)]
    pub property_types: Vec<PropertyType>,

    /// Transaction type: venta or alquiler
    #[arg(short = 't', long)]
    pub transaction_type: Option<TransactionType>,

    /// Stop after this many listings
    #[arg(short = 'l', long)]
    pub limit: Option<NonZeroUsize>,

    /// Directory the CSV file is written to
    #[arg(long, default_value = "data")]
    pub output_dir: PathBuf,

    /// Pause between page requests, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// HTTP request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Proxy for all requests, e.g. an egress point in Argentina
    #[arg(long)]
    pub proxy: Option<String>,

    /// Load pages with headless Chrome instead of plain HTTP
    #[arg(long)]
    pub browser: bool,

    /// What to do with a results page whose layout is not recognized
    #[arg(long, value_enum, default_value_t = ParseErrorPolicy::Abort)]
    pub on_parse_error: ParseErrorPolicy,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn search_query(&self) -> Result<SearchQuery> {
        match &self.url {
            Some(url) => SearchQuery::from_url(
                url,
                self.property_types.clone(),
                self.transaction_type,
                self.limit,
            ),
            None if self.property_types.is_empty() && self.transaction_type.is_none() => {
                Ok(SearchQuery {
                    limit: self.limit,
                    ..SearchQuery::default()
                })
            }
            None => SearchQuery::build(
                self.property_types.clone(),
                self.transaction_type.unwrap_or(TransactionType::Rental),
                self.limit,
            ),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            proxy: self.proxy.clone(),
            ..FetchSettings::default()
        }
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            delay: Duration::from_millis(self.delay_ms),
            on_parse_error: self.on_parse_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::types::DEFAULT_SEARCH_URL;

    fn try_parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("zonaprop-scraper").chain(args.iter().copied()))
    }

    fn parse(args: &[&str]) -> Args {
        try_parse(args).unwrap()
    }

    #[test]
    fn no_arguments_scrape_rental_apartments() {
        let args = parse(&[]);
        let query = args.search_query().unwrap();
        assert_eq!(query.base_url.as_str(), DEFAULT_SEARCH_URL);
        assert_eq!(query.limit, None);
        assert_eq!(args.output_dir, PathBuf::from("data"));
        assert_eq!(args.run_settings().on_parse_error, ParseErrorPolicy::Abort);
    }

    #[test]
    fn short_flags_build_the_search() {
        let args = parse(&["-p", "casas", "ph", "-t", "venta", "-l", "25"]);
        let query = args.search_query().unwrap();
        assert_eq!(
            query.base_url.as_str(),
            "https://www.zonaprop.com.ar/casas-ph-venta.html"
        );
        assert_eq!(query.property_types, vec![PropertyType::House, PropertyType::Ph]);
        assert_eq!(query.limit.map(NonZeroUsize::get), Some(25));
    }

    #[test]
    fn explicit_url_is_used_as_is() {
        let args = parse(&["--url", "https://www.zonaprop.com.ar/terrenos-venta.html"]);
        let query = args.search_query().unwrap();
        assert_eq!(query.base_url.as_str(), "https://www.zonaprop.com.ar/terrenos-venta.html");
        assert_eq!(query.transaction_type, TransactionType::Sale);
        assert_eq!(query.property_types, vec![PropertyType::Land]);
    }

    #[test]
    fn rejects_zero_limit_and_unknown_types() {
        assert!(try_parse(&["--limit", "0"]).is_err());
        assert!(try_parse(&["-p", "castillos"]).is_err());
        assert!(try_parse(&["-t", "permuta"]).is_err());
    }

    #[test]
    fn settings_follow_flags() {
        let args = parse(&[
            "--delay-ms",
            "0",
            "--timeout-secs",
            "5",
            "--proxy",
            "http://ar.proxy:3128",
            "--on-parse-error",
            "skip",
        ]);
        assert!(args.run_settings().delay.is_zero());
        assert_eq!(args.run_settings().on_parse_error, ParseErrorPolicy::Skip);
        let fetch = args.fetch_settings();
        assert_eq!(fetch.timeout, Duration::from_secs(5));
        assert_eq!(fetch.proxy.as_deref(), Some("http://ar.proxy:3128"));
    }
}
