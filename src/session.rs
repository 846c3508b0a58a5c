use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::controller::{CatalogController, CommitOutcome, FetchTicket, FilterChange, RequestToken};
use crate::error::FetchError;
use crate::fetcher::CatalogFetcher;
use crate::filter::FilterState;
use crate::types::CatalogPage;

type Completion = (RequestToken, Result<CatalogPage, FetchError>);

/// Event-loop driver around a `CatalogController`.
///
/// Fetches run as spawned tasks and report back over a channel; commits
/// happen only on the task that owns the session, in arrival order, and the
/// controller's token check decides which arrivals count. Superseded
/// requests are not aborted.
pub struct CatalogSession<F> {
    controller: CatalogController,
    fetcher: Arc<F>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<F> CatalogSession<F>
where
    F: CatalogFetcher + 'static,
{
    pub fn new(controller: CatalogController, fetcher: Arc<F>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            fetcher,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn controller(&self) -> &CatalogController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CatalogController {
        &mut self.controller
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Applies a filter change and starts its fetch. Returns the new state.
    pub fn dispatch(&mut self, change: FilterChange) -> FilterState {
        let ticket = self.controller.apply(change);
        let state = ticket.state.clone();
        self.spawn(ticket);
        state
    }

    /// Fetches the current state again, e.g. first load or retry.
    pub fn refresh(&mut self) {
        let ticket = self.controller.begin_fetch();
        self.spawn(ticket);
    }

    fn spawn(&mut self, ticket: FetchTicket) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        self.in_flight += 1;
        debug!("Spawning catalog fetch {}", ticket.token.value());

        let FetchTicket { token, state } = ticket;
        let fetch = tokio::spawn(async move { fetcher.fetch(&state).await });
        tokio::spawn(async move {
            // A panicked fetch still reports, so `in_flight` always drains.
            let result = fetch.await.unwrap_or_else(|err| {
                warn!("Catalog fetch {} aborted: {}", token.value(), err);
                Err(FetchError::network(format!("fetch task failed: {}", err)))
            });
            // Err only if the session was dropped.
            let _ = tx.send((token, result));
        });
    }

    /// Waits for the next fetch to finish and commits it. `None` when nothing
    /// is in flight.
    pub async fn next_completion(&mut self) -> Option<CommitOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let (token, result) = self.rx.recv().await?;
        self.in_flight -= 1;
        let outcome = self.controller.complete(token, result);
        debug!("Catalog fetch {} finished: {:?}", token.value(), outcome);
        Some(outcome)
    }

    /// Drains every in-flight fetch. Returns the outcome of the latest one.
    pub async fn settle(&mut self) -> Option<CommitOutcome> {
        let mut latest = None;
        while let Some(outcome) = self.next_completion().await {
            if outcome != CommitOutcome::Stale {
                latest = Some(outcome);
            }
        }
        latest
    }
}
