use thiserror::Error;

/// Failure to retrieve a page. Always fatal to the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} refused access (HTTP {status}), the request origin looks geo-blocked")]
    Blocked { url: String, status: u16 },

    #[error("{url} returned an empty page, the request origin looks geo-blocked")]
    Empty { url: String },

    #[error("browser failed to load {url}: {message}")]
    Browser { url: String, message: String },
}

impl FetchError {
    /// Classify a non-success HTTP status
    pub fn from_status(url: &str, status: u16) -> Self {
        match status {
            403 | 451 => FetchError::Blocked { url: url.to_string(), status },
            _ => FetchError::Status { url: url.to_string(), status },
        }
    }

    /// Whether the failure points at the site rejecting our network origin
    pub fn is_blocked(&self) -> bool {
        matches!(self, FetchError::Blocked { .. } | FetchError::Empty { .. })
    }
}

/// A results page whose markup did not match the extraction ruleset
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no listing blocks found on {url}")]
    NoListings { url: String },

    #[error("next-page link '{href}' on {url} is not a valid URL")]
    BadNextLink { url: String, href: String },
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page {page}: {source}")]
    Fetch {
        page: usize,
        #[source]
        source: FetchError,
    },

    #[error("page {page}: {source}")]
    Parse {
        page: usize,
        #[source]
        source: ParseError,
    },
}
