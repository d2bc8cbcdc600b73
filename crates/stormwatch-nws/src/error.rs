use thiserror::Error;

/// Errors returned by the NWS API client and the overlay feed client.
#[derive(Debug, Error)]
pub enum NwsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429; the API asked us to slow down.
    #[error("rate limited at {url}")]
    RateLimited { url: String },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// An affected-zone reference that does not look like `.../zones/{type}/{id}`.
    #[error("invalid zone reference '{0}'")]
    InvalidZoneRef(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
