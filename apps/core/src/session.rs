use std::sync::Arc;

use crate::action_executor::{dispatch, plan, DispatchError, DispatchMode};
use crate::discovery::{aggregate, CandidateProvider, ProviderFailure, SearchType};
use crate::host::{CancelToken, CloseReason, Hosts};
use crate::model::{CandidateItem, CandidateKind};
use crate::navigation::{NavCommand, Selection, DEFAULT_PAGE_SIZE};
use crate::ranking::{RankedCandidate, SortMode};

/// Immutable snapshot of one query's results, best first per the sort mode.
pub type ResultView = Arc<[RankedCandidate]>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,
    #[error("session was already loaded")]
    AlreadyLoaded,
    #[error("navigation failed: {0}")]
    NavigationFailed(crate::host::HostError),
    #[error("command execution failed: {0}")]
    ExecutionFailed(crate::host::HostError),
}

impl From<DispatchError> for SessionError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::NavigationFailed(error) => Self::NavigationFailed(error),
            DispatchError::ExecutionFailed(error) => Self::ExecutionFailed(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub search_type: SearchType,
    pub sort_mode: SortMode,
    pub page_size: usize,
}

impl SessionOptions {
    pub fn new(search_type: SearchType, sort_mode: SortMode, page_size: usize) -> Self {
        Self {
            search_type,
            sort_mode,
            page_size,
        }
    }

    pub fn with_defaults(search_type: SearchType) -> Self {
        Self::new(
            search_type,
            default_sort_mode(search_type),
            DEFAULT_PAGE_SIZE,
        )
    }
}

pub fn default_sort_mode(search_type: SearchType) -> SortMode {
    match search_type {
        SearchType::Symbols => SortMode::LineNumber,
        SearchType::Files | SearchType::Commands | SearchType::CommandBars | SearchType::Mixed => {
            SortMode::Fuzzy
        }
    }
}

#[derive(Debug)]
pub struct LoadSummary {
    pub candidate_count: usize,
    pub failures: Vec<ProviderFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was selected; the session stays open.
    NothingSelected,
    Committed(CandidateKind),
}

/// One popup invocation: load once, then query and navigate until closed.
pub struct SearchSession {
    options: SessionOptions,
    providers: Vec<Box<dyn CandidateProvider>>,
    hosts: Hosts,
    candidates: Vec<Arc<CandidateItem>>,
    loaded: bool,
    query: String,
    results: ResultView,
    selection: Selection,
    closed: Option<CloseReason>,
    cancel: CancelToken,
}

impl SearchSession {
    pub fn new(options: SessionOptions, hosts: Hosts) -> Self {
        Self {
            options,
            providers: Vec::new(),
            hosts,
            candidates: Vec::new(),
            loaded: false,
            query: String::new(),
            results: Arc::from(Vec::new()),
            selection: Selection::new(options.page_size),
            closed: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_providers(mut self, providers: Vec<Box<dyn CandidateProvider>>) -> Self {
        self.providers = providers;
        self
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn candidates(&self) -> &[Arc<CandidateItem>] {
        &self.candidates
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> ResultView {
        Arc::clone(&self.results)
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection.index()
    }

    pub fn selected(&self) -> Option<&RankedCandidate> {
        self.selection.index().and_then(|index| self.results.get(index))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some() || self.cancel.is_cancelled()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.closed
    }

    /// Token a focus-loss watcher can trip; the session treats it as
    /// `cancel(FocusLost)` on its next call.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Snapshots candidates from the providers relevant to the search type.
    /// Provider failures are reported in the summary, never fatal.
    pub async fn load(&mut self) -> Result<LoadSummary, SessionError> {
        self.ensure_open()?;
        if self.loaded {
            return Err(SessionError::AlreadyLoaded);
        }

        let report = aggregate(&self.providers, self.options.search_type).await;
        self.ensure_open()?;

        self.candidates = report.candidates.into_iter().map(Arc::new).collect();
        self.loaded = true;
        self.recompute();

        tracing::info!(
            search_type = ?self.options.search_type,
            candidates = self.candidates.len(),
            failed_providers = report.failures.len(),
            "session loaded"
        );

        Ok(LoadSummary {
            candidate_count: self.candidates.len(),
            failures: report.failures,
        })
    }

    pub fn search(&mut self, query: &str) -> Result<ResultView, SessionError> {
        self.ensure_open()?;
        query.clone_into(&mut self.query);
        self.recompute();
        tracing::debug!(
            query = %self.query,
            results = self.results.len(),
            "query evaluated"
        );
        Ok(self.results())
    }

    /// Moves the selection without previewing.
    pub fn move_selection(&mut self, command: NavCommand) -> Result<Option<usize>, SessionError> {
        self.ensure_open()?;
        Ok(self.selection.apply(command))
    }

    /// Keyboard navigation: move, then preview the new selection.
    pub async fn navigate(&mut self, command: NavCommand) -> Result<Option<usize>, SessionError> {
        let index = self.move_selection(command)?;
        self.preview().await?;
        Ok(index)
    }

    /// Pointer selection of a row.
    pub fn select(&mut self, index: usize) -> Result<Option<usize>, SessionError> {
        self.ensure_open()?;
        Ok(self.selection.select(index))
    }

    /// Navigates to the selected file or symbol while keeping the popup open.
    /// Commands are left alone.
    pub async fn preview(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let Some(item) = self.selected().map(|entry| Arc::clone(&entry.item)) else {
            return Ok(());
        };

        dispatch(
            plan(&item, DispatchMode::Preview),
            self.hosts.navigation.as_ref(),
            self.hosts.commands.as_ref(),
        )
        .await
        .map_err(|error| {
            tracing::warn!(item = %item.name, %error, "preview navigation failed");
            SessionError::from(error)
        })
    }

    /// Closes the session, then navigates to or executes the selected item.
    /// Closing first matters: executing may open another modal surface.
    pub async fn commit(&mut self) -> Result<CommitOutcome, SessionError> {
        self.ensure_open()?;
        let Some(item) = self.selected().map(|entry| Arc::clone(&entry.item)) else {
            return Ok(CommitOutcome::NothingSelected);
        };

        self.close(CloseReason::Committed);
        dispatch(
            plan(&item, DispatchMode::Commit),
            self.hosts.navigation.as_ref(),
            self.hosts.commands.as_ref(),
        )
        .await
        .map_err(|error| {
            tracing::warn!(item = %item.name, %error, "commit effect failed");
            SessionError::from(error)
        })?;

        Ok(CommitOutcome::Committed(item.kind()))
    }

    /// Pointer click on a row: select it and commit.
    pub async fn commit_at(&mut self, index: usize) -> Result<CommitOutcome, SessionError> {
        self.select(index)?;
        self.commit().await
    }

    /// Escape or focus loss. Returns false when the session was already closed.
    pub fn cancel(&mut self, reason: CloseReason) -> bool {
        if self.closed.is_some() {
            return false;
        }
        if self.cancel.is_cancelled() {
            self.close(CloseReason::FocusLost);
            return false;
        }
        self.close(reason);
        true
    }

    fn ensure_open(&mut self) -> Result<(), SessionError> {
        if self.closed.is_some() {
            return Err(SessionError::Closed);
        }
        if self.cancel.is_cancelled() {
            self.close(CloseReason::FocusLost);
            return Err(SessionError::Closed);
        }
        Ok(())
    }

    fn close(&mut self, reason: CloseReason) {
        self.closed = Some(reason);
        self.cancel.cancel();
        tracing::info!(?reason, "session closed");
        self.hosts.dismissal.dismiss(reason);
    }

    fn recompute(&mut self) {
        let ranked = crate::search::search(&self.candidates, &self.query, self.options.sort_mode);
        self.results = Arc::from(ranked);
        self.selection.reset(self.results.len());
    }
}
