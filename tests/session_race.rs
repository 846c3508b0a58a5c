use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use storefront_catalog::{
    CatalogController, CatalogFetcher, CatalogPage, CatalogSession, CommitOutcome, FetchError,
    FetchErrorKind, FilterChange, FilterState, GridOptions, ProductSummary,
};

/// Latency and outcome depend on the requested category.
struct ScriptedFetcher {
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

fn product(id: &str) -> ProductSummary {
    serde_json::from_value(json!({ "_id": id, "name": id, "price": 1000 })).unwrap()
}

#[async_trait]
impl CatalogFetcher for ScriptedFetcher {
    async fn fetch(&self, state: &FilterState) -> Result<CatalogPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let category = state.category.clone().unwrap_or_default();
        let delay = match category.as_str() {
            "Phones" => 300,
            "Broken" => 20,
            _ => 50,
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if category == "Broken" {
            return Err(FetchError::http(500, "Request failed 500"));
        }
        let id = if category.is_empty() { "all" } else { category.as_str() };
        Ok(CatalogPage::new(vec![product(&format!("{}-1", id))], 1))
    }
}

fn committed_ids<F: CatalogFetcher + 'static>(session: &CatalogSession<F>) -> Vec<String> {
    session
        .controller()
        .page()
        .map(|page| page.products.iter().map(|p| p.id.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_never_overwrites_newer_results() {
    let fetcher = ScriptedFetcher::new();
    let mut session = CatalogSession::new(CatalogController::new(), Arc::clone(&fetcher));

    session.dispatch(FilterChange::Category(Some("Phones".into())));
    session.dispatch(FilterChange::Category(Some("Accessories".into())));
    assert_eq!(session.in_flight(), 2);

    assert_eq!(session.next_completion().await, Some(CommitOutcome::Committed));
    assert_eq!(committed_ids(&session), vec!["Accessories-1"]);

    assert_eq!(session.next_completion().await, Some(CommitOutcome::Stale));
    assert_eq!(committed_ids(&session), vec!["Accessories-1"]);
    assert_eq!(session.next_completion().await, None);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn early_stale_response_keeps_loading_state() {
    let fetcher = ScriptedFetcher::new();
    let mut session = CatalogSession::new(CatalogController::new(), fetcher);

    session.dispatch(FilterChange::Category(Some("Accessories".into())));
    session.dispatch(FilterChange::Category(Some("Phones".into())));

    // The fast, superseded response lands first and is dropped.
    assert_eq!(session.next_completion().await, Some(CommitOutcome::Stale));
    assert!(session.controller().is_loading());
    assert!(session.controller().grid(&GridOptions::default()).is_skeleton());

    assert_eq!(session.next_completion().await, Some(CommitOutcome::Committed));
    assert_eq!(committed_ids(&session), vec!["Phones-1"]);
    assert!(!session.controller().is_loading());
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_last_good_page_and_retry_recovers() {
    let fetcher = ScriptedFetcher::new();
    let mut session = CatalogSession::new(CatalogController::new(), fetcher);

    session.refresh();
    assert_eq!(session.settle().await, Some(CommitOutcome::Committed));
    assert_eq!(committed_ids(&session), vec!["all-1"]);

    session.dispatch(FilterChange::Category(Some("Broken".into())));
    assert_eq!(session.settle().await, Some(CommitOutcome::Failed));
    assert_eq!(committed_ids(&session), vec!["all-1"]);
    let notice = session.controller().notice().cloned().unwrap();
    assert!(notice.is_retryable());

    // Still showing the old grid, not skeletons.
    let grid = session.controller().grid(&GridOptions::default());
    assert_eq!(grid.products().count(), 1);

    session.controller_mut().dismiss_notice();
    session.dispatch(FilterChange::Category(Some("Tablets".into())));
    assert_eq!(session.settle().await, Some(CommitOutcome::Committed));
    assert_eq!(committed_ids(&session), vec!["Tablets-1"]);
    assert!(session.controller().notice().is_none());
}

#[tokio::test(start_paused = true)]
async fn rapid_changes_commit_only_the_last() {
    let fetcher = ScriptedFetcher::new();
    let mut session = CatalogSession::new(CatalogController::new(), Arc::clone(&fetcher));

    for category in ["Phones", "Laptops", "Phones", "Audio"] {
        session.dispatch(FilterChange::Category(Some(category.into())));
    }
    session.dispatch(FilterChange::Page(2));

    assert_eq!(session.settle().await, Some(CommitOutcome::Committed));
    assert_eq!(committed_ids(&session), vec!["Audio-1"]);
    assert_eq!(session.controller().filters().page, 2);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 5);
}

struct PanickingFetcher;

#[async_trait]
impl CatalogFetcher for PanickingFetcher {
    async fn fetch(&self, state: &FilterState) -> Result<CatalogPage, FetchError> {
        if state.search.as_deref() == Some("boom") {
            panic!("fetcher blew up");
        }
        Ok(CatalogPage::new(vec![product("ok-1")], 1))
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_fetch_still_settles_as_failure() {
    let mut session = CatalogSession::new(CatalogController::new(), Arc::new(PanickingFetcher));

    session.refresh();
    assert_eq!(session.settle().await, Some(CommitOutcome::Committed));

    session.dispatch(FilterChange::Search(Some("boom".into())));
    assert_eq!(session.settle().await, Some(CommitOutcome::Failed));
    assert_eq!(session.in_flight(), 0);
    assert_eq!(committed_ids(&session), vec!["ok-1"]);
    assert_eq!(
        session.controller().notice().map(|e| e.kind),
        Some(FetchErrorKind::Network)
    );
}
