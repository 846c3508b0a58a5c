pub mod api_client;
pub mod config;
pub mod controller;
pub mod deals;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod query_sync;
pub mod render;
pub mod session;
pub mod types;

// Re-export commonly used types for convenience
pub use api_client::CatalogApi;
pub use config::CatalogConfig;
pub use controller::{CatalogController, CommitOutcome, FetchTicket, FilterChange, RequestToken};
pub use error::{ConfigError, FetchError, FetchErrorKind};
pub use fetcher::CatalogFetcher;
pub use filter::{DealType, FilterState, FilterStore, SortOrder};
pub use query_sync::{from_query, to_query, QueryMap};
pub use render::{render_grid, Grid, GridCell, GridOptions, PageControl, Pagination, ProductCardView};
pub use session::CatalogSession;
pub use types::{Brand, CatalogPage, Category, ProductDetail, ProductSummary};
