//! Client-side orchestration of clinical cases.
//!
//! [`Workbench`] is the single state container. It owns the [`CaseStore`],
//! derives listing pages through [`view`], and delegates per-case workflows
//! to the [`DetailController`] and [`IntakeController`]. Network work is
//! expressed as [`AsyncCommand`]s which a [`Runner`] executes against any
//! [`CaseRepository`](clinicase_api_client::CaseRepository).

pub mod app;
pub mod async_ops;
pub mod detail;
pub mod intake;
pub mod runtime;
pub mod store;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use app::{FlashLevel, Screen, StateNote, Workbench};
pub use async_ops::{AsyncCommand, CommandResult, DeleteOutcome, PendingCommand};
pub use detail::{DetailAction, DetailController, DetailError, SummarizeStatus};
pub use intake::{IntakeController, IntakeField};
pub use runtime::Runner;
pub use store::{CaseStore, Upsert};
pub use view::{CasePage, DEFAULT_PAGE_SIZE};
