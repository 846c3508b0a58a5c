use async_trait::async_trait;

use crate::error::FetchError;
use crate::filter::FilterState;
use crate::types::CatalogPage;

/// Turns one `FilterState` into exactly one listing request.
///
/// Implementations never panic past this boundary: every outcome is a page
/// or a typed `FetchError`.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self, state: &FilterState) -> Result<CatalogPage, FetchError>;
}
