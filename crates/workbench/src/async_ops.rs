use std::time::Duration;

use tracing::debug;

use clinicase_api_client::CaseRepository;
use clinicase_core::{CaseId, NewCase, PatientCase};

/// Commands that require async I/O (network calls or timers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncCommand {
    FetchCases,
    FetchCase(CaseId),
    CreateCase(NewCase),
    SummarizeCase(CaseId),
    DeleteCase(CaseId),
    /// Return to the listing once the intake confirmation has been shown.
    RedirectToList { delay: Duration },
}

/// A command stamped with the container epoch it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    pub epoch: u64,
    pub command: AsyncCommand,
}

/// How a delete resolved when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The backend no longer had the case (404).
    AlreadyGone,
}

/// Results returned by async commands. Errors are already user-facing text.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Cases {
        epoch: u64,
        result: Result<Vec<PatientCase>, String>,
    },
    Case {
        epoch: u64,
        id: CaseId,
        result: Result<Option<PatientCase>, String>,
    },
    Created {
        epoch: u64,
        result: Result<PatientCase, String>,
    },
    Summarized {
        epoch: u64,
        id: CaseId,
        result: Result<PatientCase, String>,
    },
    Deleted {
        epoch: u64,
        id: CaseId,
        result: Result<DeleteOutcome, String>,
    },
    NavigateToList {
        epoch: u64,
    },
}

impl CommandResult {
    pub fn epoch(&self) -> u64 {
        match self {
            Self::Cases { epoch, .. }
            | Self::Case { epoch, .. }
            | Self::Created { epoch, .. }
            | Self::Summarized { epoch, .. }
            | Self::Deleted { epoch, .. }
            | Self::NavigateToList { epoch } => *epoch,
        }
    }
}

pub async fn execute<R: CaseRepository>(pending: PendingCommand, repo: &R) -> CommandResult {
    let PendingCommand { epoch, command } = pending;
    match command {
        AsyncCommand::FetchCases => {
            let result = repo
                .list_cases()
                .await
                .map_err(|e| format!("Failed to load cases: {e}"));
            CommandResult::Cases { epoch, result }
        }

        AsyncCommand::FetchCase(id) => {
            let result = match repo.get_case(&id).await {
                Ok(case) => Ok(Some(case)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(format!("Failed to load case: {e}")),
            };
            CommandResult::Case { epoch, id, result }
        }

        AsyncCommand::CreateCase(case) => {
            let result = repo
                .create_case(&case)
                .await
                .map_err(|e| format!("Failed to create case: {e}"));
            CommandResult::Created { epoch, result }
        }

        AsyncCommand::SummarizeCase(id) => {
            debug!(case_id = %id, "summarize requested");
            let result = repo
                .summarize_case(&id)
                .await
                .map_err(|e| format!("Failed to summarize case: {e}"));
            CommandResult::Summarized { epoch, id, result }
        }

        AsyncCommand::DeleteCase(id) => {
            let result = match repo.delete_case(&id).await {
                Ok(()) => Ok(DeleteOutcome::Deleted),
                Err(e) if e.is_not_found() => Ok(DeleteOutcome::AlreadyGone),
                Err(e) => Err(format!("Failed to delete case: {e}")),
            };
            CommandResult::Deleted { epoch, id, result }
        }

        AsyncCommand::RedirectToList { delay } => {
            tokio::time::sleep(delay).await;
            CommandResult::NavigateToList { epoch }
        }
    }
}
