use crate::host::{CommandHost, HostError, NavigationHost};
use crate::model::{CandidateItem, CandidatePayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Selection moved; the popup stays open.
    Preview,
    /// The user picked the item; the popup is already closed.
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect<'a> {
    GoToFile(&'a CandidateItem),
    GoToSymbol(&'a CandidateItem),
    Execute(&'a str),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("navigation failed: {0}")]
    NavigationFailed(#[source] HostError),
    #[error("execution failed: {0}")]
    ExecutionFailed(#[source] HostError),
}

/// Files and symbols are navigated to on both preview and commit; commands
/// only ever run on commit.
pub fn plan(item: &CandidateItem, mode: DispatchMode) -> Effect<'_> {
    match (&item.payload, mode) {
        (CandidatePayload::File { .. }, _) => Effect::GoToFile(item),
        (CandidatePayload::Symbol { .. }, _) => Effect::GoToSymbol(item),
        (
            CandidatePayload::Command { invocation_token }
            | CandidatePayload::KnownCommand { invocation_token },
            DispatchMode::Commit,
        ) => Effect::Execute(invocation_token),
        (_, DispatchMode::Preview) => Effect::Nothing,
    }
}

pub async fn dispatch(
    effect: Effect<'_>,
    navigation: &dyn NavigationHost,
    commands: &dyn CommandHost,
) -> Result<(), DispatchError> {
    match effect {
        Effect::GoToFile(item) => navigation
            .go_to_file(item)
            .await
            .map_err(DispatchError::NavigationFailed),
        Effect::GoToSymbol(item) => navigation
            .go_to_symbol(item)
            .await
            .map_err(DispatchError::NavigationFailed),
        Effect::Execute(token) => commands
            .execute(token)
            .await
            .map_err(DispatchError::ExecutionFailed),
        Effect::Nothing => Ok(()),
    }
}
