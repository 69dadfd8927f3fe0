use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::warn;

use clinicase_api_client::CaseRepository;

use crate::app::{StateNote, Workbench};
use crate::async_ops::{execute, CommandResult, PendingCommand};

/// Executes queued commands concurrently and hands results back in the
/// order they complete. The [`Workbench`] itself never leaves the caller.
pub struct Runner<R> {
    repo: Arc<R>,
    tasks: JoinSet<CommandResult>,
}

impl<R> Runner<R>
where
    R: CaseRepository + 'static,
{
    pub fn new(repo: R) -> Self {
        Self::with_shared(Arc::new(repo))
    }

    pub fn with_shared(repo: Arc<R>) -> Self {
        Self {
            repo,
            tasks: JoinSet::new(),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn spawn(&mut self, pending: PendingCommand) {
        let repo = Arc::clone(&self.repo);
        self.tasks
            .spawn(async move { execute(pending, repo.as_ref()).await });
    }

    /// Spawn everything the workbench has queued.
    pub fn dispatch(&mut self, workbench: &mut Workbench) -> usize {
        let commands = workbench.take_commands();
        let count = commands.len();
        for pending in commands {
            self.spawn(pending);
        }
        count
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Next completed result, or `None` when nothing is in flight.
    pub async fn next_result(&mut self) -> Option<CommandResult> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(result) => return Some(result),
                Err(e) => warn!("command task failed: {e}"),
            }
        }
        None
    }

    /// Dispatch, apply, repeat until the workbench is idle. Returns the
    /// absorbed state notes in the order they occurred.
    pub async fn run_until_idle(&mut self, workbench: &mut Workbench) -> Vec<StateNote> {
        let mut notes = Vec::new();
        loop {
            self.dispatch(workbench);
            let Some(result) = self.next_result().await else {
                break;
            };
            notes.extend(workbench.apply_command_result(result));
        }
        notes
    }
}
