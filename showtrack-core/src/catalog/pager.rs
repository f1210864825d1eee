use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use showtrack_model::{
    CatalogPage, CatalogRepresentation, FilterSpec, RepresentationKind,
    ShowSummary,
};

use crate::context::CoreContext;
use crate::error::{CatalogError, Result};
use crate::providers::{CatalogSource, DiscoverQuery, SourcePage, SourceQuery};

use super::cursor::PageCursor;
use super::slot::{FetchSlot, FetchTicket};

/// Non-error outcomes of a load call.
#[derive(Debug, Clone, PartialEq)]
pub enum PageLoad {
    /// A page was fetched and applied to the cursor.
    Loaded(CatalogPage),
    /// Every page has already been loaded; no request was issued.
    Exhausted,
    /// Another fetch owns the slot; this call was ignored, not queued.
    InProgress,
    /// The fetch was cancelled or replaced before it could apply.
    Superseded,
}

impl PageLoad {
    pub fn page(&self) -> Option<&CatalogPage> {
        match self {
            PageLoad::Loaded(page) => Some(page),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, PageLoad::Exhausted)
    }
}

#[derive(Debug, Default)]
struct RepresentationState {
    representation: Option<CatalogRepresentation>,
    cursor: PageCursor,
    slot: FetchSlot,
}

impl RepresentationState {
    fn activated(representation: CatalogRepresentation) -> Self {
        Self {
            representation: Some(representation),
            ..Self::default()
        }
    }
}

/// Releases the slot when a fetch ends, including when its future is
/// dropped mid-flight.
struct InFlightGuard<'a> {
    state: &'a Mutex<RepresentationState>,
    ticket: &'a FetchTicket,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().slot.finish(self.ticket);
    }
}

/// Pages the catalog for all four representations at once.
///
/// Each representation keeps its own cursor and cache and is resumable
/// independently of the others; switching away never clears anything.
pub struct CatalogPager {
    source: Arc<dyn CatalogSource>,
    context: CoreContext,
    popular: Mutex<RepresentationState>,
    filtered: Mutex<RepresentationState>,
    upcoming: Mutex<RepresentationState>,
    search: Mutex<RepresentationState>,
}

impl std::fmt::Debug for CatalogPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogPager")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl CatalogPager {
    pub fn new(source: Arc<dyn CatalogSource>, context: CoreContext) -> Self {
        Self {
            source,
            context,
            popular: Mutex::new(RepresentationState::activated(
                CatalogRepresentation::Popular,
            )),
            filtered: Mutex::new(RepresentationState::default()),
            upcoming: Mutex::new(RepresentationState::activated(
                CatalogRepresentation::Upcoming,
            )),
            search: Mutex::new(RepresentationState::default()),
        }
    }

    fn state(&self, kind: RepresentationKind) -> &Mutex<RepresentationState> {
        match kind {
            RepresentationKind::Popular => &self.popular,
            RepresentationKind::Filtered => &self.filtered,
            RepresentationKind::Upcoming => &self.upcoming,
            RepresentationKind::Search => &self.search,
        }
    }

    /// Start `representation` over from page 1.
    ///
    /// Any fetch in flight for the same kind is cancelled first, so a new
    /// search query can never be overwritten by the previous one.
    pub async fn load_first(
        &self,
        representation: CatalogRepresentation,
    ) -> Result<PageLoad> {
        let kind = representation.kind();
        let ticket = {
            let mut state = self.state(kind).lock();
            if state.slot.cancel() {
                debug!(representation = %kind, "superseding in-flight fetch");
            }
            state.cursor.reset();
            state.representation = Some(representation.clone());
            state.slot.begin()
        };
        self.run_fetch(kind, representation, 1, ticket).await
    }

    /// Fetch the next page of `kind`.
    pub async fn load_more(&self, kind: RepresentationKind) -> Result<PageLoad> {
        let (representation, page, ticket) = {
            let mut state = self.state(kind).lock();
            if state.slot.is_busy() {
                debug!(representation = %kind, "load_more ignored, fetch in flight");
                return Ok(PageLoad::InProgress);
            }
            let Some(representation) = state.representation.clone() else {
                return Err(CatalogError::InactiveRepresentation(kind));
            };
            if state.cursor.is_exhausted() {
                return Ok(PageLoad::Exhausted);
            }
            let page = state.cursor.next_page();
            (representation, page, state.slot.begin())
        };
        self.run_fetch(kind, representation, page, ticket).await
    }

    /// Convenience for `load_first(Search { query })`.
    pub async fn search(&self, query: impl Into<String>) -> Result<PageLoad> {
        self.load_first(CatalogRepresentation::search(query)).await
    }

    /// Point the filtered representation at `filter`.
    ///
    /// An equal filter keeps the cache and cursor and returns `false`. A
    /// different one cancels the outstanding fetch and resets the cursor;
    /// the next `load_more` starts at page 1.
    pub fn switch_filter(&self, filter: FilterSpec) -> bool {
        let representation = CatalogRepresentation::filtered(filter);
        let mut state = self.filtered.lock();
        if state.representation.as_ref() == Some(&representation) {
            return false;
        }
        state.slot.cancel();
        state.cursor.reset();
        state.representation = Some(representation);
        true
    }

    /// Cancel the outstanding fetch for `kind`, leaving the cursor as it was.
    pub fn cancel_active(&self, kind: RepresentationKind) -> bool {
        self.state(kind).lock().slot.cancel()
    }

    /// Drop everything cached for `kind`. Search and filtered
    /// representations also forget their query.
    pub fn clear(&self, kind: RepresentationKind) {
        let mut state = self.state(kind).lock();
        state.slot.cancel();
        state.cursor.reset();
        if matches!(
            kind,
            RepresentationKind::Search | RepresentationKind::Filtered
        ) {
            state.representation = None;
        }
    }

    pub fn in_progress(&self, kind: RepresentationKind) -> bool {
        self.state(kind).lock().slot.is_busy()
    }

    pub fn cursor(&self, kind: RepresentationKind) -> PageCursor {
        self.state(kind).lock().cursor.clone()
    }

    pub fn items(&self, kind: RepresentationKind) -> Vec<ShowSummary> {
        self.state(kind).lock().cursor.items().to_vec()
    }

    pub fn representation(
        &self,
        kind: RepresentationKind,
    ) -> Option<CatalogRepresentation> {
        self.state(kind).lock().representation.clone()
    }

    fn resolve(&self, representation: &CatalogRepresentation) -> SourceQuery {
        match representation {
            CatalogRepresentation::Popular => SourceQuery::Popular,
            CatalogRepresentation::Filtered { filter } => {
                SourceQuery::Discover(DiscoverQuery::filtered(filter.clone()))
            }
            CatalogRepresentation::Upcoming => {
                SourceQuery::Discover(DiscoverQuery::upcoming(self.context.today()))
            }
            CatalogRepresentation::Search { query } => {
                SourceQuery::Search(query.clone())
            }
        }
    }

    async fn run_fetch(
        &self,
        kind: RepresentationKind,
        representation: CatalogRepresentation,
        page: u32,
        ticket: FetchTicket,
    ) -> Result<PageLoad> {
        let state = self.state(kind);
        let _guard = InFlightGuard {
            state,
            ticket: &ticket,
        };

        let query = self.resolve(&representation);
        let fetched = tokio::select! {
            biased;
            _ = ticket.token().cancelled() => {
                debug!(representation = %kind, page, "fetch cancelled");
                return Ok(PageLoad::Superseded);
            }
            fetched = self.source.fetch_page(&query, page, self.context.language()) => fetched,
        };

        match fetched {
            Ok(source_page) => Ok(Self::apply(
                state,
                representation,
                page,
                &ticket,
                source_page,
            )),
            Err(_) if ticket.is_cancelled() => Ok(PageLoad::Superseded),
            Err(err) => {
                warn!(representation = %kind, page, "catalog fetch failed: {err}");
                Err(err.into())
            }
        }
    }

    fn apply(
        state: &Mutex<RepresentationState>,
        representation: CatalogRepresentation,
        page: u32,
        ticket: &FetchTicket,
        source_page: SourcePage,
    ) -> PageLoad {
        let mut state = state.lock();
        if !state.slot.is_current(ticket) {
            debug!(representation = %representation.kind(), page, "discarding superseded page");
            return PageLoad::Superseded;
        }

        let SourcePage { items, total_pages } = source_page;
        state.cursor.apply_page(page, total_pages, items.iter().cloned());
        let total_pages = state.cursor.total_pages().unwrap_or(total_pages);
        debug!(
            representation = %representation.kind(),
            page,
            total_pages,
            cached = state.cursor.len(),
            "page applied"
        );

        PageLoad::Loaded(CatalogPage {
            representation,
            page,
            total_pages,
            items,
        })
    }
}
