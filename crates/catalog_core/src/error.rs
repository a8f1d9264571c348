use shared::error::{ErrorKind, FailureReport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("unexpected catalog payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("catalog request was dropped before it settled")]
    Abandoned,
    #[error("invalid catalog base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("page {requested} is outside 1..={total_pages}")]
    PageOutOfRange { requested: u32, total_pages: u32 },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Transport(_) => ErrorKind::Transport,
            CatalogError::Status { .. } => ErrorKind::Status,
            CatalogError::Payload(_) => ErrorKind::Payload,
            CatalogError::Abandoned => ErrorKind::Cancelled,
            CatalogError::InvalidBaseUrl { .. } => ErrorKind::Config,
            CatalogError::PageOutOfRange { .. } => ErrorKind::Validation,
        }
    }

    pub fn report(&self) -> FailureReport {
        FailureReport::new(self.kind(), self.to_string())
    }
}
