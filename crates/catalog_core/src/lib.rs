use std::sync::Arc;

use shared::{
    domain::{Category, SortKey},
    error::FailureReport,
    protocol::normalize_categories,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod pagination;
pub mod query;
pub mod results;
pub mod source;
pub mod view;

pub use config::{load_settings, Settings};
pub use error::CatalogError;
pub use pagination::{PaginationView, PAGE_SIZE};
pub use query::{CatalogQuery, QueryScope, QueryState};
pub use results::{FetchStatus, FetchTicket, ResultState, GENERIC_FETCH_ERROR};
pub use source::{CatalogSource, HttpCatalogSource};

use pagination::total_pages;
use results::RequestFence;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// User intents relayed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIntent {
    SetSearch(String),
    SetCategory(String),
    SetSort(SortKey),
    SetPage(u32),
    NextPage,
    PrevPage,
    ClearFilters,
    Retry,
    /// Replaces the whole query at page 1.
    ApplyQuery(QueryState),
}

impl CatalogIntent {
    fn name(&self) -> &'static str {
        match self {
            CatalogIntent::SetSearch(_) => "set_search",
            CatalogIntent::SetCategory(_) => "set_category",
            CatalogIntent::SetSort(_) => "set_sort",
            CatalogIntent::SetPage(_) => "set_page",
            CatalogIntent::NextPage => "next_page",
            CatalogIntent::PrevPage => "prev_page",
            CatalogIntent::ClearFilters => "clear_filters",
            CatalogIntent::Retry => "retry",
            CatalogIntent::ApplyQuery(_) => "apply_query",
        }
    }
}

#[derive(Debug, Clone)]
pub enum CatalogEvent {
    QueryChanged(QueryState),
    FetchStarted {
        ticket: FetchTicket,
        query: CatalogQuery,
    },
    ResultsUpdated {
        ticket: FetchTicket,
        item_count: usize,
        total_count: u64,
    },
    FetchFailed {
        ticket: FetchTicket,
        message: String,
        report: FailureReport,
    },
    StaleResponseDiscarded {
        ticket: FetchTicket,
    },
    CategoriesLoaded(Vec<Category>),
    CategoriesUnavailable(FailureReport),
}

/// Everything a renderer needs, captured under one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView {
    pub query: QueryState,
    pub results: ResultState,
    pub categories: Vec<Category>,
    pub pagination: PaginationView,
}

#[derive(Default)]
struct ControllerState {
    query: QueryState,
    results: ResultState,
    categories: Vec<Category>,
    categories_requested: bool,
    fence: RequestFence,
}

struct FetchCycle {
    ticket: FetchTicket,
    query: CatalogQuery,
}

/// Runs `on_abandon` against the controller state when dropped before
/// `disarm`, which covers cancelled futures and panicking sources.
struct AbandonGuard<F>
where
    F: FnOnce(&mut ControllerState) + Send + 'static,
{
    inner: Arc<Mutex<ControllerState>>,
    on_abandon: Option<F>,
}

impl<F> AbandonGuard<F>
where
    F: FnOnce(&mut ControllerState) + Send + 'static,
{
    fn new(inner: &Arc<Mutex<ControllerState>>, on_abandon: F) -> Self {
        Self {
            inner: Arc::clone(inner),
            on_abandon: Some(on_abandon),
        }
    }

    fn disarm(mut self) {
        self.on_abandon = None;
    }
}

impl<F> Drop for AbandonGuard<F>
where
    F: FnOnce(&mut ControllerState) + Send + 'static,
{
    fn drop(&mut self) {
        let Some(on_abandon) = self.on_abandon.take() else {
            return;
        };
        if let Ok(mut state) = self.inner.try_lock() {
            on_abandon(&mut *state);
            return;
        }
        // Lock is briefly held elsewhere; settle once it frees up.
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let inner = Arc::clone(&self.inner);
                runtime.spawn(async move {
                    let mut state = inner.lock().await;
                    on_abandon(&mut *state);
                });
            }
            Err(_) => warn!("no runtime left to settle an abandoned request"),
        }
    }
}

pub struct CatalogController {
    source: Arc<dyn CatalogSource>,
    inner: Arc<Mutex<ControllerState>>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogController {
    pub fn new(source: Arc<dyn CatalogSource>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            source,
            inner: Arc::new(Mutex::new(ControllerState::default())),
            events,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Arc<Self>, CatalogError> {
        let source = HttpCatalogSource::from_settings(settings)?;
        Ok(Self::new(Arc::new(source)))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> CatalogView {
        let guard = self.inner.lock().await;
        CatalogView {
            query: guard.query.clone(),
            results: guard.results.clone(),
            categories: guard.categories.clone(),
            pagination: PaginationView::new(guard.query.page, guard.results.total_count),
        }
    }

    /// Loads the category list and the first product page side by side.
    pub async fn initialize(&self) {
        tokio::join!(self.load_categories(), self.retry());
    }

    /// One-shot; later calls return immediately. Failures only leave the list
    /// empty. A call dropped mid-flight lets the next call try again.
    pub async fn load_categories(&self) {
        {
            let mut guard = self.inner.lock().await;
            if guard.categories_requested {
                return;
            }
            guard.categories_requested = true;
        }

        let reopen = AbandonGuard::new(&self.inner, |state: &mut ControllerState| {
            state.categories_requested = false;
        });
        let outcome = self.source.fetch_categories().await;
        reopen.disarm();

        match outcome {
            Ok(descriptors) => {
                let categories = normalize_categories(&descriptors);
                let dropped = descriptors.len() - categories.len();
                if dropped > 0 {
                    warn!(dropped, "ignored category entries without an identifier");
                }
                info!(count = categories.len(), "loaded categories");
                self.inner.lock().await.categories = categories.clone();
                let _ = self.events.send(CatalogEvent::CategoriesLoaded(categories));
            }
            Err(err) => {
                warn!(kind = ?err.kind(), "failed to fetch categories: {err}");
                let _ = self
                    .events
                    .send(CatalogEvent::CategoriesUnavailable(err.report()));
            }
        }
    }

    pub async fn set_search(&self, term: &str) {
        self.run_infallible(CatalogIntent::SetSearch(term.to_string()))
            .await;
    }

    pub async fn set_category(&self, category: &str) {
        self.run_infallible(CatalogIntent::SetCategory(category.to_string()))
            .await;
    }

    pub async fn set_sort(&self, sort: SortKey) {
        self.run_infallible(CatalogIntent::SetSort(sort)).await;
    }

    /// Rejects pages outside `1..=total_pages` without fetching.
    pub async fn set_page(&self, page: u32) -> Result<(), CatalogError> {
        self.handle(CatalogIntent::SetPage(page)).await.map(|_| ())
    }

    /// Returns whether a fetch was issued.
    pub async fn next_page(&self) -> bool {
        matches!(self.handle(CatalogIntent::NextPage).await, Ok(true))
    }

    /// Returns whether a fetch was issued.
    pub async fn prev_page(&self) -> bool {
        matches!(self.handle(CatalogIntent::PrevPage).await, Ok(true))
    }

    pub async fn clear_filters(&self) {
        self.run_infallible(CatalogIntent::ClearFilters).await;
    }

    /// Re-runs the fetch for the current query.
    pub async fn retry(&self) {
        self.run_infallible(CatalogIntent::Retry).await;
    }

    /// Replaces search, category and sort in one step and fetches page 1 once.
    pub async fn apply_query(&self, query: QueryState) {
        self.run_infallible(CatalogIntent::ApplyQuery(query)).await;
    }

    /// Applies the intent and waits for its fetch to settle. Returns whether a
    /// fetch was issued.
    pub async fn handle(&self, intent: CatalogIntent) -> Result<bool, CatalogError> {
        match self.begin_intent(intent).await? {
            Some(cycle) => {
                self.run_cycle(cycle).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Applies the intent now and settles its fetch on a background task, so a
    /// renderer can keep accepting input while requests are in flight.
    pub async fn dispatch(
        self: &Arc<Self>,
        intent: CatalogIntent,
    ) -> Result<Option<JoinHandle<()>>, CatalogError> {
        let Some(cycle) = self.begin_intent(intent).await? else {
            return Ok(None);
        };
        let controller = Arc::clone(self);
        Ok(Some(tokio::spawn(async move {
            controller.run_cycle(cycle).await;
        })))
    }

    async fn run_infallible(&self, intent: CatalogIntent) {
        if let Err(err) = self.handle(intent).await {
            warn!("intent rejected: {err}");
        }
    }

    async fn begin_intent(&self, intent: CatalogIntent) -> Result<Option<FetchCycle>, CatalogError> {
        let intent_name = intent.name();
        let (cycle, query_state) = {
            let mut guard = self.inner.lock().await;
            let total_pages = total_pages(guard.results.total_count);
            let query = &mut guard.query;
            let (fetch, query_changed) = match intent {
                CatalogIntent::SetSearch(term) => {
                    query.set_search(&term);
                    (true, true)
                }
                CatalogIntent::SetCategory(category) => {
                    query.set_category(&category);
                    (true, true)
                }
                CatalogIntent::SetSort(sort) => {
                    query.set_sort(sort);
                    (true, true)
                }
                CatalogIntent::SetPage(page) => {
                    query.set_page(page, total_pages)?;
                    (true, true)
                }
                CatalogIntent::NextPage => {
                    let moved = query.next_page(total_pages);
                    (moved, moved)
                }
                CatalogIntent::PrevPage => {
                    let moved = query.prev_page();
                    (moved, moved)
                }
                CatalogIntent::ClearFilters => {
                    query.clear_filters();
                    (true, true)
                }
                CatalogIntent::Retry => (true, false),
                CatalogIntent::ApplyQuery(state) => {
                    *query = QueryState { page: 1, ..state };
                    (true, true)
                }
            };

            if !fetch {
                debug!(intent = intent_name, "intent left the query unchanged");
                return Ok(None);
            }

            let query = CatalogQuery::from_state(&guard.query);
            let ticket = guard.fence.issue();
            guard.results.begin();
            let query_state = query_changed.then(|| guard.query.clone());
            (FetchCycle { ticket, query }, query_state)
        };

        debug!(intent = intent_name, ticket = cycle.ticket.0, "intent applied");
        if let Some(state) = query_state {
            let _ = self.events.send(CatalogEvent::QueryChanged(state));
        }
        let _ = self.events.send(CatalogEvent::FetchStarted {
            ticket: cycle.ticket,
            query: cycle.query.clone(),
        });
        Ok(Some(cycle))
    }

    async fn run_cycle(&self, cycle: FetchCycle) {
        let FetchCycle { ticket, query } = cycle;
        info!(
            ticket = ticket.0,
            scope = ?query.scope,
            offset = query.offset,
            "fetching products"
        );
        let events = self.events.clone();
        let settle = AbandonGuard::new(&self.inner, move |state: &mut ControllerState| {
            if !state.fence.is_current(ticket) {
                return;
            }
            state.results.apply_failure();
            let err = CatalogError::Abandoned;
            warn!(ticket = ticket.0, "product fetch dropped before it settled");
            let _ = events.send(CatalogEvent::FetchFailed {
                ticket,
                message: GENERIC_FETCH_ERROR.to_string(),
                report: err.report(),
            });
        });
        let outcome = self.source.fetch_products(&query).await;

        let mut guard = self.inner.lock().await;
        settle.disarm();
        if !guard.fence.is_current(ticket) {
            let latest = guard.fence.latest().map(|t| t.0);
            drop(guard);
            debug!(ticket = ticket.0, ?latest, "discarding superseded product response");
            let _ = self
                .events
                .send(CatalogEvent::StaleResponseDiscarded { ticket });
            return;
        }

        match outcome {
            Ok(page) => {
                let item_count = page.products.len();
                let total_count = page.total;
                guard.results.apply_page(page);
                drop(guard);
                info!(ticket = ticket.0, item_count, total_count, "products loaded");
                let _ = self.events.send(CatalogEvent::ResultsUpdated {
                    ticket,
                    item_count,
                    total_count,
                });
            }
            Err(err) => {
                guard.results.apply_failure();
                drop(guard);
                warn!(
                    ticket = ticket.0,
                    kind = ?err.kind(),
                    "failed to fetch products: {err}"
                );
                let _ = self.events.send(CatalogEvent::FetchFailed {
                    ticket,
                    message: GENERIC_FETCH_ERROR.to_string(),
                    report: err.report(),
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
