/// Failure of a single backend request.
///
/// Cache entries keep these behind an `Arc` so one failed fetch can be handed to every reader
/// that was waiting on it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::HttpStatus { status: 404, .. })
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Network { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}
