//! In-memory [`CaseRepository`] for exercising the workbench without a
//! backend. Individual calls can be held open and released in any order,
//! and failures can be injected per operation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::oneshot;
use uuid::Uuid;

use clinicase_api_client::{CaseRepository, ClientError};
use clinicase_core::{CaseId, CaseSummary, NewCase, PatientCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    Create,
    List,
    Get,
    Update,
    Summarize,
    Delete,
}

/// A held call. Releasing (or dropping) it lets the call proceed.
#[derive(Debug)]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

#[derive(Default)]
struct FakeState {
    cases: Vec<PatientCase>,
    summaries: HashMap<CaseId, CaseSummary>,
    gates: HashMap<(FakeOp, CaseId), oneshot::Receiver<()>>,
    failures: HashMap<FakeOp, ClientError>,
    calls: Vec<(FakeOp, Option<CaseId>)>,
}

#[derive(Default)]
pub struct FakeRepository {
    state: Mutex<FakeState>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with `cases`, returned by `list_cases` in this order.
    pub fn with_cases(cases: Vec<PatientCase>) -> Self {
        let repo = Self::default();
        repo.lock().cases = cases;
        repo
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Summary produced by the next summarize call for `id`.
    pub fn set_summary(&self, id: &CaseId, summary: CaseSummary) {
        self.lock().summaries.insert(id.clone(), summary);
    }

    /// Hold the next `op` call for `id` until the returned gate is released.
    pub fn hold(&self, op: FakeOp, id: &CaseId) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.lock().gates.insert((op, id.clone()), rx);
        Gate(tx)
    }

    /// Make the next `op` call fail with `err`.
    pub fn fail_next(&self, op: FakeOp, err: ClientError) {
        self.lock().failures.insert(op, err);
    }

    /// Remove a case behind the client's back.
    pub fn remove(&self, id: &CaseId) {
        self.lock().cases.retain(|case| &case.id != id);
    }

    pub fn cases(&self) -> Vec<PatientCase> {
        self.lock().cases.clone()
    }

    pub fn calls(&self, op: FakeOp) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|(called, _)| *called == op)
            .count()
    }

    async fn enter(&self, op: FakeOp, id: Option<&CaseId>) -> Result<(), ClientError> {
        let gate = {
            let mut state = self.lock();
            state.calls.push((op, id.cloned()));
            id.and_then(|id| state.gates.remove(&(op, id.clone())))
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match self.lock().failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn not_found(id: &CaseId) -> ClientError {
    ClientError::remote(404, format!("Case not found: {id}"))
}

impl CaseRepository for FakeRepository {
    async fn create_case(&self, case: &NewCase) -> Result<PatientCase, ClientError> {
        self.enter(FakeOp::Create, None).await?;
        let mut state = self.lock();
        // Strictly increasing so later creations sort as newer.
        let now = Utc::now() + ChronoDuration::milliseconds(state.cases.len() as i64);
        let created = PatientCase {
            id: CaseId::new(Uuid::new_v4().to_string()),
            case_title: case.case_title.clone(),
            patient_age: case.patient_age.clone(),
            gender: case.gender,
            clinical_notes: case.clinical_notes.clone(),
            created_at: Some(now),
            updated_at: Some(now),
            summary: None,
        };
        state.cases.push(created.clone());
        Ok(created)
    }

    async fn list_cases(&self) -> Result<Vec<PatientCase>, ClientError> {
        self.enter(FakeOp::List, None).await?;
        Ok(self.lock().cases.clone())
    }

    async fn get_case(&self, id: &CaseId) -> Result<PatientCase, ClientError> {
        self.enter(FakeOp::Get, Some(id)).await?;
        self.lock()
            .cases
            .iter()
            .find(|case| &case.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn update_case(&self, id: &CaseId, case: &NewCase) -> Result<PatientCase, ClientError> {
        self.enter(FakeOp::Update, Some(id)).await?;
        let mut state = self.lock();
        let stored = state
            .cases
            .iter_mut()
            .find(|stored| &stored.id == id)
            .ok_or_else(|| not_found(id))?;
        stored.case_title = case.case_title.clone();
        stored.patient_age = case.patient_age.clone();
        stored.gender = case.gender;
        stored.clinical_notes = case.clinical_notes.clone();
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn summarize_case(&self, id: &CaseId) -> Result<PatientCase, ClientError> {
        self.enter(FakeOp::Summarize, Some(id)).await?;
        let mut guard = self.lock();
        let FakeState {
            cases, summaries, ..
        } = &mut *guard;
        let stored = cases
            .iter_mut()
            .find(|stored| &stored.id == id)
            .ok_or_else(|| not_found(id))?;
        let summary = summaries.get(id).cloned().unwrap_or_else(|| CaseSummary {
            chief_complaint: stored.case_title.clone(),
            confidence_score: Some(50),
            ..CaseSummary::default()
        });
        stored.summary = Some(summary);
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn delete_case(&self, id: &CaseId) -> Result<(), ClientError> {
        self.enter(FakeOp::Delete, Some(id)).await?;
        let mut state = self.lock();
        let before = state.cases.len();
        state.cases.retain(|case| &case.id != id);
        if state.cases.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
