use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Network failure, timeout, or TLS error while talking to the proxy.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The proxy returned 200 with a body that is not a product listing
    /// (error pages from the proxy or the site come back with 200). Usually
    /// means the site's markup changed; not worth an automatic retry.
    #[error("page from {url} does not look like a product listing")]
    UnexpectedPageShape { url: String },

    #[error("page number must be >= 1")]
    InvalidPage,

    #[error("unknown category id: {0}")]
    UnknownCategory(String),

    #[error("product page is missing required field \"{field}\"")]
    IncompleteProduct { field: &'static str },
}
