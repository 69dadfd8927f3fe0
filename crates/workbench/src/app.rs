use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info, warn};

use clinicase_core::{CaseId, PatientCase};
use clinicase_runtime_config::WorkbenchSettings;

use crate::async_ops::{AsyncCommand, CommandResult, DeleteOutcome, PendingCommand};
use crate::detail::{DeleteDecision, DetailController};
use crate::intake::IntakeController;
use crate::store::CaseStore;
use crate::view::{self, CasePage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    CaseList,
    CaseDetail,
    NewCase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

/// Stale-id outcomes that are absorbed instead of reported as failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateNote {
    /// A delete targeted a case that was already gone.
    AlreadyDeleted(CaseId),
    /// A result arrived for a case no longer in the collection.
    Gone(CaseId),
}

/// The workbench state container.
///
/// Owns the collection, the listing cursor, both controllers and the queue of
/// commands waiting to be executed. Every transition is a `&mut self`
/// method; async work is only described here (as [`AsyncCommand`]s) and its
/// results come back through [`apply_command_result`](Self::apply_command_result).
#[derive(Debug)]
pub struct Workbench {
    pub store: CaseStore,
    pub detail: DetailController,
    pub intake: IntakeController,
    pub screen: Screen,

    // Listing
    search: String,
    page_size: usize,
    pub loading: bool,
    pub load_error: Option<String>,

    pub flash_message: Option<(String, FlashLevel)>,
    /// Id assigned to the most recent successful intake submit.
    pub last_created: Option<CaseId>,
    redirect_delay: Duration,

    // Async plumbing
    epoch: u64,
    pending: VecDeque<PendingCommand>,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(&WorkbenchSettings::default())
    }
}

impl Workbench {
    pub fn new(settings: &WorkbenchSettings) -> Self {
        Self {
            store: CaseStore::new(),
            detail: DetailController::new(),
            intake: IntakeController::new(),
            screen: Screen::CaseList,
            search: String::new(),
            page_size: settings.page_size.max(1),
            loading: false,
            load_error: None,
            flash_message: None,
            last_created: None,
            redirect_delay: settings.redirect_delay(),
            epoch: 0,
            pending: VecDeque::new(),
        }
    }

    // ── Command queue ─────────────────────────────────────────────────

    fn queue(&mut self, command: AsyncCommand) {
        self.pending.push_back(PendingCommand {
            epoch: self.epoch,
            command,
        });
    }

    /// Drain commands queued since the last call, in issue order.
    pub fn take_commands(&mut self) -> Vec<PendingCommand> {
        self.pending.drain(..).collect()
    }

    pub fn has_pending_commands(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The cases screen is going away: results of anything already issued
    /// must not land on it.
    pub fn teardown(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.pending.clear();
        self.detail.abandon_in_flight();
        self.intake.abandon_in_flight();
        self.loading = false;
        debug!(epoch = self.epoch, "workbench torn down");
    }

    // ── Listing ───────────────────────────────────────────────────────

    pub fn refresh(&mut self) {
        self.loading = true;
        self.queue(AsyncCommand::FetchCases);
    }

    /// Reload a single case from the backend.
    pub fn reload_case(&mut self, id: &CaseId) {
        self.queue(AsyncCommand::FetchCase(id.clone()));
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub fn current_page(&self) -> CasePage<'_> {
        view::derive_page(&self.store, &self.search, self.store.page(), self.page_size)
    }

    pub fn next_page(&mut self) {
        let page = self.current_page();
        if page.has_next() {
            let next = page.page + 1;
            self.store.set_page(next);
        }
    }

    pub fn prev_page(&mut self) {
        let page = self.current_page();
        if page.has_prev() {
            let prev = page.page - 1;
            self.store.set_page(prev);
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.current_page().total_pages;
        self.store.set_page(view::clamp_page(page, total));
    }

    // ── Navigation ────────────────────────────────────────────────────

    /// Select a case and show its details. False when the id is unknown.
    pub fn open_case(&mut self, id: &CaseId) -> bool {
        if !self.detail.select(&self.store, id) {
            return false;
        }
        self.screen = Screen::CaseDetail;
        true
    }

    pub fn show_list(&mut self) {
        self.screen = Screen::CaseList;
    }

    pub fn open_intake(&mut self) {
        self.screen = Screen::NewCase;
    }

    pub fn active_case(&self) -> Option<&PatientCase> {
        self.detail.active_case(&self.store)
    }

    // ── Detail actions ────────────────────────────────────────────────

    /// Request a summary. Returns false when nothing was queued.
    pub fn summarize(&mut self, id: &CaseId) -> bool {
        if !self.detail.begin_summarize(&self.store, id) {
            debug!(case_id = %id, "summarize ignored");
            return false;
        }
        self.queue(AsyncCommand::SummarizeCase(id.clone()));
        true
    }

    pub fn summarize_active(&mut self) -> bool {
        match self.detail.active_id().cloned() {
            Some(id) => self.summarize(&id),
            None => false,
        }
    }

    pub fn request_delete(&mut self, id: &CaseId) {
        self.detail.request_delete(id);
    }

    pub fn cancel_delete(&mut self) {
        self.detail.cancel_delete();
    }

    /// Confirm the pending delete. An already-gone case settles right here.
    pub fn confirm_delete(&mut self) -> Option<StateNote> {
        match self.detail.confirm_delete(&mut self.store) {
            DeleteDecision::Send(id) => {
                self.queue(AsyncCommand::DeleteCase(id));
                None
            }
            DeleteDecision::Settled(note) => {
                self.flash_info("Case was already deleted");
                Some(note)
            }
            DeleteDecision::Ignored => None,
        }
    }

    // ── Intake ────────────────────────────────────────────────────────

    /// Validate and submit the intake form. Returns false when nothing was
    /// sent (invalid input or a submit already in flight).
    pub fn submit_intake(&mut self) -> bool {
        match self.intake.submit() {
            Some(case) => {
                self.queue(AsyncCommand::CreateCase(case));
                true
            }
            None => false,
        }
    }

    // ── Apply async command result ────────────────────────────────────

    pub fn apply_command_result(&mut self, result: CommandResult) -> Option<StateNote> {
        if result.epoch() != self.epoch {
            debug!(
                result_epoch = result.epoch(),
                epoch = self.epoch,
                "dropping result issued before teardown"
            );
            return None;
        }

        match result {
            CommandResult::Cases { result, .. } => {
                self.loading = false;
                match result {
                    Ok(cases) => {
                        info!(count = cases.len(), "cases loaded");
                        self.store.replace_all(cases);
                        self.detail.reconcile(&self.store);
                        self.load_error = None;
                    }
                    Err(e) => {
                        self.flash_error(e.clone());
                        self.load_error = Some(e);
                    }
                }
                None
            }

            CommandResult::Case { id, result, .. } => match result {
                Ok(Some(_)) if !self.store.contains(&id) => {
                    debug!(case_id = %id, "reload resolved for a case no longer present");
                    Some(StateNote::Gone(id))
                }
                Ok(Some(case)) if case.id != id => {
                    warn!(case_id = %id, returned_id = %case.id, "reload returned another case");
                    self.flash_error(format!(
                        "Failed to load case: response was for case {}",
                        case.id
                    ));
                    None
                }
                Ok(Some(case)) => {
                    self.store.upsert(case);
                    None
                }
                Ok(None) => {
                    self.store.remove(&id);
                    if self.detail.active_id() == Some(&id) {
                        self.detail.clear_selection();
                    }
                    Some(StateNote::Gone(id))
                }
                Err(e) => {
                    self.flash_error(e);
                    None
                }
            },

            CommandResult::Created { result, .. } => {
                let created_id = result.as_ref().ok().map(|case| case.id.clone());
                if self.intake.finish_submit(result) {
                    if let Some(id) = &created_id {
                        info!(case_id = %id, "case created");
                    }
                    self.last_created = created_id;
                    self.flash_success("Case created successfully");
                    self.refresh();
                    let delay = self.redirect_delay;
                    self.queue(AsyncCommand::RedirectToList { delay });
                }
                None
            }

            CommandResult::Summarized { id, result, .. } => {
                let succeeded = result.is_ok();
                let note = self.detail.finish_summarize(&mut self.store, &id, result);
                if succeeded && note.is_none() {
                    info!(case_id = %id, "summary updated");
                }
                note
            }

            CommandResult::Deleted { id, result, .. } => match result {
                Ok(outcome) => {
                    self.detail.finish_delete(&mut self.store, &id, Ok(()));
                    if self.screen == Screen::CaseDetail && self.detail.active_id().is_none() {
                        self.screen = Screen::CaseList;
                    }
                    match outcome {
                        DeleteOutcome::Deleted => {
                            info!(case_id = %id, "case deleted");
                            self.flash_success("Case deleted");
                            None
                        }
                        DeleteOutcome::AlreadyGone => {
                            debug!(case_id = %id, "backend no longer had the case");
                            self.flash_info("Case was already deleted");
                            Some(StateNote::AlreadyDeleted(id))
                        }
                    }
                }
                Err(e) => {
                    self.detail.finish_delete(&mut self.store, &id, Err(e));
                    None
                }
            },

            CommandResult::NavigateToList { .. } => {
                self.intake.acknowledge_success();
                if self.screen == Screen::NewCase {
                    self.screen = Screen::CaseList;
                }
                None
            }
        }
    }

    pub fn flash_success(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), FlashLevel::Success));
    }

    pub fn flash_error(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), FlashLevel::Error));
    }

    pub fn flash_info(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), FlashLevel::Info));
    }
}
