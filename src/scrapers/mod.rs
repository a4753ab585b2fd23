pub mod browser;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod preloaded;
pub mod traits;
pub mod types;
pub mod zonaprop;

pub use browser::BrowserFetcher;
pub use error::ScrapeError;
pub use http::HttpFetcher;
pub use pipeline::{Pipeline, RunOutput};
pub use traits::Fetcher;
pub use types::{FetchSettings, ParseErrorPolicy, RunSettings, SearchQuery};
