use serde::{Deserialize, Serialize};

use crate::host::CloseReason;
use crate::model::{CandidateItem, CandidateKind};
use crate::navigation::NavCommand;
use crate::ranking::RankedCandidate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigateRequest {
    pub command: NavCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectRequest {
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CancelRequest {
    pub reason: CloseReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SessionRequest {
    Search(SearchRequest),
    Navigate(NavigateRequest),
    Select(SelectRequest),
    Preview,
    Commit,
    CommitAt(SelectRequest),
    Cancel(CancelRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultDto {
    pub score: i64,
    pub item: CandidateItem,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultsResponse {
    pub query: String,
    pub results: Vec<ResultDto>,
    pub selection: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionResponse {
    pub selection: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitResponse {
    pub committed: Option<CandidateKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClosedResponse {
    pub reason: CloseReason,
    pub closed_now: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SessionResponse {
    Results(ResultsResponse),
    Selection(SelectionResponse),
    Commit(CommitResponse),
    Closed(ClosedResponse),
}

impl From<&RankedCandidate> for ResultDto {
    fn from(value: &RankedCandidate) -> Self {
        Self {
            score: value.score,
            item: value.item.as_ref().clone(),
        }
    }
}
