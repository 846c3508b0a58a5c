//! Page-level owner of the listing page's `FilterState` and `CatalogPage`.
//!
//! Every fetch is stamped with a monotonically increasing token. Only the
//! completion carrying the latest token is committed, so a slow response
//! for an old filter can never overwrite a newer one.

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::filter::{DealType, FilterState, FilterStore, SortOrder};
use crate::query_sync::{from_query, to_query, QueryMap};
use crate::render::{render_grid, Grid, GridOptions, Pagination};
use crate::types::CatalogPage;

/// One user-visible change to the listing filters.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Category(Option<String>),
    Brand(Option<String>),
    PriceRange { min: i64, max: i64 },
    Sort(SortOrder),
    Search(Option<String>),
    DealType(Option<DealType>),
    Page(i64),
    PageSize(i64),
    Clear,
    /// Back/forward navigation or a pasted link.
    Navigate(QueryMap),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A fetch the caller must perform and hand back through `complete`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub token: RequestToken,
    pub state: FilterState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Failed; the previous page (if any) stays visible.
    Failed,
    /// Superseded by a newer request and dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct CatalogController {
    store: FilterStore,
    page: Option<CatalogPage>,
    latest: u64,
    loading: bool,
    notice: Option<FetchError>,
}

impl CatalogController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a URL query, e.g. on first page load.
    pub fn from_query(query: &QueryMap) -> Self {
        Self {
            store: FilterStore::with_state(from_query(query)),
            ..Self::default()
        }
    }

    pub fn filters(&self) -> &FilterState {
        self.store.state()
    }

    pub fn page(&self) -> Option<&CatalogPage> {
        self.page.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&FetchError> {
        self.notice.as_ref()
    }

    pub fn latest_token(&self) -> Option<RequestToken> {
        (self.latest > 0).then_some(RequestToken(self.latest))
    }

    /// Query mapping for the address bar.
    pub fn query(&self) -> QueryMap {
        to_query(self.store.state())
    }

    /// Applies `change` and issues the fetch for the resulting state.
    pub fn apply(&mut self, change: FilterChange) -> FetchTicket {
        match change {
            FilterChange::Category(v) => self.store.set_category(v.as_deref()),
            FilterChange::Brand(v) => self.store.set_brand(v.as_deref()),
            FilterChange::PriceRange { min, max } => self.store.set_price_range(min, max),
            FilterChange::Sort(v) => self.store.set_sort(v),
            FilterChange::Search(v) => self.store.set_search(v.as_deref()),
            FilterChange::DealType(v) => self.store.set_deal_type(v),
            FilterChange::Page(n) => self.store.set_page(n),
            FilterChange::PageSize(n) => self.store.set_page_size(n),
            FilterChange::Clear => self.store.clear(),
            FilterChange::Navigate(query) => self.store.replace(from_query(&query)),
        };
        self.begin_fetch()
    }

    /// Issues a fetch for the current state. Also used for retry.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest += 1;
        self.loading = true;
        FetchTicket {
            token: RequestToken(self.latest),
            state: self.store.state().clone(),
        }
    }

    pub fn retry(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    pub fn complete(
        &mut self,
        token: RequestToken,
        result: Result<CatalogPage, FetchError>,
    ) -> CommitOutcome {
        if token.0 != self.latest {
            debug!(
                "Discarding stale catalog response (token {}, latest {})",
                token.0, self.latest
            );
            return CommitOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.page = Some(page);
                self.notice = None;
                CommitOutcome::Committed
            }
            Err(err) => {
                warn!("Catalog fetch failed, keeping previous results: {}", err);
                self.notice = Some(err);
                CommitOutcome::Failed
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn grid(&self, options: &GridOptions) -> Grid {
        render_grid(self.page.as_ref(), self.loading, options)
    }

    pub fn pagination(&self) -> Option<Pagination> {
        let state = self.store.state();
        self.page
            .as_ref()
            .map(|page| Pagination::new(page.total, state.page_size, state.page))
    }
}
