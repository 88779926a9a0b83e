use serde::{Deserialize, Serialize};

use crate::contract::{
    ClosedResponse, CommitResponse, ResultDto, ResultsResponse, SelectionResponse, SessionRequest,
    SessionResponse,
};
use crate::session::{CommitOutcome, SearchSession, SessionError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    Closed,
    AlreadyLoaded,
    NavigationFailed,
    ExecutionFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: SessionResponse },
    Err { error: ErrorResponse },
}

pub async fn handle_request(
    session: &mut SearchSession,
    request: SessionRequest,
) -> TransportResponse {
    match apply(session, request).await {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err {
            error: map_session_error(error),
        },
    }
}

pub async fn handle_json(session: &mut SearchSession, payload: &str) -> String {
    let response = match serde_json::from_str::<SessionRequest>(payload) {
        Ok(request) => handle_request(session, request).await,
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|error| {
        tracing::error!(%error, "transport response failed to serialize");
        format!(
            "{{\"status\":\"err\",\"error\":{{\"code\":\"invalid_json\",\"message\":{}}}}}",
            serde_json::Value::String(error.to_string())
        )
    })
}

async fn apply(
    session: &mut SearchSession,
    request: SessionRequest,
) -> Result<SessionResponse, SessionError> {
    match request {
        SessionRequest::Search(search) => {
            let results = session.search(&search.query)?;
            Ok(SessionResponse::Results(ResultsResponse {
                query: search.query,
                results: results.iter().map(ResultDto::from).collect(),
                selection: session.selection(),
            }))
        }
        SessionRequest::Navigate(navigate) => {
            let selection = session.navigate(navigate.command).await?;
            Ok(SessionResponse::Selection(SelectionResponse { selection }))
        }
        SessionRequest::Select(select) => {
            let selection = session.select(select.index)?;
            Ok(SessionResponse::Selection(SelectionResponse { selection }))
        }
        SessionRequest::Preview => {
            session.preview().await?;
            Ok(SessionResponse::Selection(SelectionResponse {
                selection: session.selection(),
            }))
        }
        SessionRequest::Commit => commit_response(session.commit().await?),
        SessionRequest::CommitAt(select) => commit_response(session.commit_at(select.index).await?),
        SessionRequest::Cancel(cancel) => {
            let closed_now = session.cancel(cancel.reason);
            Ok(SessionResponse::Closed(ClosedResponse {
                reason: session.close_reason().unwrap_or(cancel.reason),
                closed_now,
            }))
        }
    }
}

fn commit_response(outcome: CommitOutcome) -> Result<SessionResponse, SessionError> {
    let committed = match outcome {
        CommitOutcome::NothingSelected => None,
        CommitOutcome::Committed(kind) => Some(kind),
    };
    Ok(SessionResponse::Commit(CommitResponse { committed }))
}

fn map_session_error(error: SessionError) -> ErrorResponse {
    let code = match &error {
        SessionError::Closed => ErrorCode::Closed,
        SessionError::AlreadyLoaded => ErrorCode::AlreadyLoaded,
        SessionError::NavigationFailed(_) => ErrorCode::NavigationFailed,
        SessionError::ExecutionFailed(_) => ErrorCode::ExecutionFailed,
    };
    ErrorResponse {
        code,
        message: error.to_string(),
    }
}
