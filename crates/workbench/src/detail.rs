use std::collections::HashSet;

use tracing::{debug, warn};

use clinicase_core::{CaseId, PatientCase};

use crate::store::CaseStore;
use crate::StateNote;

/// Summarization state of one case, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarizeStatus {
    Idle,
    Summarizing,
    Summarized,
    Failed,
}

/// The per-case request that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    Summarize,
    Delete,
}

/// An error surfaced on the detail screen, tied to the case it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailError {
    pub id: CaseId,
    pub action: DetailAction,
    pub message: String,
}

/// What `confirm_delete` decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteDecision {
    /// Issue the remote delete for this id.
    Send(CaseId),
    /// Nothing to send; the outcome is already known.
    Settled(StateNote),
    /// A delete for this id is already in flight, or nothing was pending.
    Ignored,
}

/// Tracks the active case and the per-case summarize/delete workflows.
///
/// The active case is held by id, so the detail view always renders the
/// store's current entry. In-flight bookkeeping and errors are keyed by id
/// and survive selection changes; an error for one case never displaces
/// another case's.
#[derive(Debug, Clone, Default)]
pub struct DetailController {
    active: Option<CaseId>,
    summarizing: HashSet<CaseId>,
    deleting: HashSet<CaseId>,
    pending_delete: Option<CaseId>,
    /// Oldest first, at most one per (id, action).
    errors: Vec<DetailError>,
}

impl DetailController {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Selection ─────────────────────────────────────────────────────

    /// Make `id` the active case. Returns false when it is not in the store.
    pub fn select(&mut self, store: &CaseStore, id: &CaseId) -> bool {
        if !store.contains(id) {
            return false;
        }
        self.active = Some(id.clone());
        true
    }

    pub fn active_id(&self) -> Option<&CaseId> {
        self.active.as_ref()
    }

    pub fn active_case<'a>(&self, store: &'a CaseStore) -> Option<&'a PatientCase> {
        self.active.as_ref().and_then(|id| store.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.active = None;
    }

    /// Re-point the selection after the collection was replaced: keep it if
    /// the case survived, otherwise fall back to the newest case.
    pub fn reconcile(&mut self, store: &CaseStore) {
        let keep = self.active.as_ref().is_some_and(|id| store.contains(id));
        if !keep {
            self.active = store.newest().map(|case| case.id.clone());
        }
        if self
            .pending_delete
            .as_ref()
            .is_some_and(|id| !store.contains(id))
        {
            self.pending_delete = None;
        }
    }

    // ── Summarize ─────────────────────────────────────────────────────

    pub fn summarize_status(&self, store: &CaseStore, id: &CaseId) -> SummarizeStatus {
        if self.summarizing.contains(id) {
            return SummarizeStatus::Summarizing;
        }
        if self.has_error(id, DetailAction::Summarize) {
            return SummarizeStatus::Failed;
        }
        match store.get(id) {
            Some(case) if case.is_summarized() => SummarizeStatus::Summarized,
            _ => SummarizeStatus::Idle,
        }
    }

    pub fn is_summarizing(&self, id: &CaseId) -> bool {
        self.summarizing.contains(id)
    }

    /// Mark `id` as summarizing. Returns false (send nothing) when a request
    /// for it is already in flight or the case is unknown.
    pub fn begin_summarize(&mut self, store: &CaseStore, id: &CaseId) -> bool {
        if !store.contains(id) || !self.summarizing.insert(id.clone()) {
            return false;
        }
        self.errors
            .retain(|err| !(&err.id == id && err.action == DetailAction::Summarize));
        true
    }

    /// Apply a resolved summarize call for `id`.
    pub fn finish_summarize(
        &mut self,
        store: &mut CaseStore,
        id: &CaseId,
        result: Result<PatientCase, String>,
    ) -> Option<StateNote> {
        self.summarizing.remove(id);
        if !store.contains(id) {
            debug!(case_id = %id, "summarize resolved for a case no longer present");
            return Some(StateNote::Gone(id.clone()));
        }
        match result {
            Ok(case) if &case.id == id => {
                store.upsert(case);
            }
            Ok(case) => {
                warn!(case_id = %id, returned_id = %case.id, "summarize returned another case");
                self.record(
                    id,
                    DetailAction::Summarize,
                    format!("Failed to summarize case: response was for case {}", case.id),
                );
            }
            Err(message) => self.record(id, DetailAction::Summarize, message),
        }
        None
    }

    // ── Delete ────────────────────────────────────────────────────────

    /// First step of a delete: ask for confirmation.
    pub fn request_delete(&mut self, id: &CaseId) {
        self.pending_delete = Some(id.clone());
    }

    pub fn pending_delete(&self) -> Option<&CaseId> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second step: the user confirmed.
    pub fn confirm_delete(&mut self, store: &mut CaseStore) -> DeleteDecision {
        let Some(id) = self.pending_delete.take() else {
            return DeleteDecision::Ignored;
        };
        if self.deleting.contains(&id) {
            return DeleteDecision::Ignored;
        }
        if !store.contains(&id) {
            debug!(case_id = %id, "delete requested for a case already gone");
            self.forget(&id);
            return DeleteDecision::Settled(StateNote::AlreadyDeleted(id));
        }
        self.deleting.insert(id.clone());
        DeleteDecision::Send(id)
    }

    pub fn is_deleting(&self, id: &CaseId) -> bool {
        self.deleting.contains(id)
    }

    /// Apply a resolved delete. `Ok` covers both an actual delete and a
    /// backend that no longer knew the case.
    pub fn finish_delete(
        &mut self,
        store: &mut CaseStore,
        id: &CaseId,
        result: Result<(), String>,
    ) {
        self.deleting.remove(id);
        match result {
            Ok(()) => {
                store.remove(id);
                self.forget(id);
            }
            Err(message) => self.record(id, DetailAction::Delete, message),
        }
    }

    fn forget(&mut self, id: &CaseId) {
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.errors.retain(|err| &err.id != id);
    }

    // ── Errors ────────────────────────────────────────────────────────

    fn record(&mut self, id: &CaseId, action: DetailAction, message: String) {
        self.errors
            .retain(|err| !(&err.id == id && err.action == action));
        self.errors.push(DetailError {
            id: id.clone(),
            action,
            message,
        });
    }

    fn has_error(&self, id: &CaseId, action: DetailAction) -> bool {
        self.errors
            .iter()
            .any(|err| &err.id == id && err.action == action)
    }

    /// The most recent error, shown on the banner.
    pub fn error(&self) -> Option<&DetailError> {
        self.errors.last()
    }

    /// The most recent error for `id`.
    pub fn error_for(&self, id: &CaseId) -> Option<&DetailError> {
        self.errors.iter().rev().find(|err| &err.id == id)
    }

    /// Dismiss the banner's error. Older errors for other cases stay.
    pub fn clear_error(&mut self) {
        self.errors.pop();
    }

    /// Dismiss every error for `id`.
    pub fn clear_errors_for(&mut self, id: &CaseId) {
        self.errors.retain(|err| &err.id != id);
    }

    /// Drop in-flight markers whose results will never be applied.
    pub fn abandon_in_flight(&mut self) {
        self.summarizing.clear();
        self.deleting.clear();
    }
}
