use thiserror::Error;

/// Errors raised while fetching or extracting Kijiji pages
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported category URL {url}: {reason}")]
    InvalidCategoryUrl { url: String, reason: String },

    /// A required element is not on the page
    #[error("\"{0}\" not found")]
    MissingField(&'static str),

    #[error("malformed \"{field}\" value: {value:?}")]
    MalformedField { field: &'static str, value: String },

    /// The site rendered a label outside the known vocabulary
    #[error("unrecognized \"{field}\" value: {value:?}")]
    UnknownVocabulary { field: &'static str, value: String },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
