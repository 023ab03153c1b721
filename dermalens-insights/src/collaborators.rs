//! Collaborator seams
//!
//! The engine performs no I/O of its own. Model execution, catalog lookup and
//! assessment history are supplied by the host application through these
//! traits; the text generator lives in [`crate::explanation::TextGenerator`].

use crate::normalizer::RawModelOutput;
use crate::progress::DateWindow;
use dermalens_common::{Assessment, CatalogItem, ProductCategory};
use thiserror::Error;

/// Failure reported by a collaborator
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// I/O error (local storage)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing store rejected or failed the request
    #[error("Store error: {0}")]
    Store(String),

    /// Stored record could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Collaborator is not available right now
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for CollaboratorError {
    fn from(err: serde_json::Error) -> Self {
        CollaboratorError::Decode(err.to_string())
    }
}

impl From<dermalens_common::Error> for CollaboratorError {
    fn from(err: dermalens_common::Error) -> Self {
        match err {
            dermalens_common::Error::Io(e) => CollaboratorError::Io(e),
            other => CollaboratorError::Decode(other.to_string()),
        }
    }
}

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// On-device model execution
#[async_trait::async_trait]
pub trait ModelRunner: Send + Sync {
    /// Runner name for logs
    fn name(&self) -> &'static str;

    /// Run inference on the current capture
    ///
    /// `Ok(None)` means the model is not ready (not loaded, or no capture yet).
    async fn run(&self) -> CollaboratorResult<Option<RawModelOutput>>;
}

/// Catalog filter passed to [`CatalogStore::in_stock_items`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: Option<ProductCategory>,
    pub retailer: Option<String>,
}

impl CatalogQuery {
    /// Every in-stock item
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(category: ProductCategory) -> Self {
        Self {
            category: Some(category),
            retailer: None,
        }
    }

    pub fn retailer(retailer: impl Into<String>) -> Self {
        Self {
            category: None,
            retailer: Some(retailer.into()),
        }
    }
}

/// Product catalog
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// In-stock items matching `query`
    ///
    /// The scorer filters on `in_stock` again, so a store that returns
    /// out-of-stock rows is tolerated.
    async fn in_stock_items(&self, query: &CatalogQuery) -> CollaboratorResult<Vec<CatalogItem>>;
}

/// Persisted assessment history
#[async_trait::async_trait]
pub trait HistoricalStore: Send + Sync {
    /// Assessments for `user_id` captured inside `window`, oldest first
    async fn assessments(
        &self,
        user_id: &str,
        window: DateWindow,
    ) -> CollaboratorResult<Vec<Assessment>>;
}
