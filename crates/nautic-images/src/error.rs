use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("redirect from {url} has no usable Location header")]
    MissingRedirectLocation { url: String },

    #[error("too many redirects starting at {url}: exceeded {max_redirects} hops")]
    TooManyRedirects { url: String, max_redirects: u32 },

    #[error("invalid image URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
