use std::io::IsTerminal;
use std::path::Path;

use anyhow::{bail, Context, Result};
use dialoguer::Confirm;

use clinicase_api_client::ApiClient;
use clinicase_core::validate::CaseDraft;
use clinicase_core::CaseId;
use clinicase_runtime_config::{ClientConfig, WorkbenchSettings};
use clinicase_workbench::{Runner, StateNote, Workbench};

use crate::output;

/// A loaded workbench plus the runner that feeds it.
struct Session {
    workbench: Workbench,
    runner: Runner<ApiClient>,
}

impl Session {
    fn connect(config: &ClientConfig) -> Result<Self> {
        let client = ApiClient::new(&config.server.url, config.server.timeout())
            .context("Failed to create HTTP client")?;
        // No confirmation screen to linger on in a one-shot command.
        let settings = WorkbenchSettings {
            redirect_delay_ms: 0,
            ..config.workbench.clone()
        };
        Ok(Self {
            workbench: Workbench::new(&settings),
            runner: Runner::new(client),
        })
    }

    async fn run(&mut self) -> Vec<StateNote> {
        self.runner.run_until_idle(&mut self.workbench).await
    }

    /// Connect and load the collection.
    async fn open(config: &ClientConfig) -> Result<Self> {
        let mut session = Self::connect(config)?;
        session.workbench.refresh();
        session.run().await;
        if let Some(err) = &session.workbench.load_error {
            bail!("{err}");
        }
        Ok(session)
    }

    fn require(&mut self, id: &CaseId) -> Result<()> {
        if !self.workbench.open_case(id) {
            bail!("case not found: {id}");
        }
        Ok(())
    }
}

pub async fn run_list(config: &ClientConfig, search: Option<String>, page: usize) -> Result<()> {
    let mut session = Session::open(config).await?;
    let wb = &mut session.workbench;
    if let Some(term) = search {
        wb.set_search(term);
    }
    wb.go_to_page(page);
    print!("{}", output::render_page(&wb.current_page()));
    Ok(())
}

pub async fn run_show(config: &ClientConfig, id: &str) -> Result<()> {
    let mut session = Session::open(config).await?;
    let id = CaseId::new(id);
    session.require(&id)?;
    if let Some(case) = session.workbench.active_case() {
        print!("{}", output::render_case(case));
    }
    Ok(())
}

pub struct CreateArgs {
    pub title: String,
    pub age: String,
    pub gender: String,
    pub notes: Option<String>,
    pub notes_file: Option<std::path::PathBuf>,
}

fn read_notes(notes: Option<String>, notes_file: Option<&Path>) -> Result<String> {
    match (notes, notes_file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read notes from {}", path.display())),
        (None, None) => Ok(String::new()),
    }
}

fn draft_from_args(args: CreateArgs) -> Result<CaseDraft> {
    let clinical_notes = read_notes(args.notes, args.notes_file.as_deref())?;
    Ok(CaseDraft {
        case_title: args.title,
        patient_age: args.age,
        gender: args.gender,
        clinical_notes,
    })
}

pub async fn run_create(config: &ClientConfig, args: CreateArgs) -> Result<()> {
    let draft = draft_from_args(args)?;
    let mut session = Session::connect(config)?;
    let wb = &mut session.workbench;
    wb.open_intake();
    wb.intake.fill(draft);
    if !wb.submit_intake() {
        let mut message = wb
            .intake
            .error()
            .unwrap_or("invalid case input")
            .to_string();
        for violation in wb.intake.violations() {
            message.push_str(&format!("\n  - {violation}"));
        }
        bail!(message);
    }

    session.run().await;
    let wb = &session.workbench;
    if let Some(err) = wb.intake.error() {
        bail!("{err}");
    }
    match &wb.last_created {
        Some(id) => println!("Case created successfully: {id}"),
        None => println!("Case created successfully"),
    }
    Ok(())
}

pub async fn run_summarize(config: &ClientConfig, id: &str) -> Result<()> {
    let mut session = Session::open(config).await?;
    let id = CaseId::new(id);
    session.require(&id)?;
    session.workbench.summarize(&id);
    eprintln!("Summarizing...");
    let notes = session.run().await;

    if notes.contains(&StateNote::Gone(id.clone())) {
        bail!("case {id} was deleted while summarizing");
    }
    if let Some(err) = session.workbench.detail.error_for(&id) {
        bail!("{}", err.message);
    }
    if let Some(case) = session.workbench.active_case() {
        print!("{}", output::render_case(case));
    }
    Ok(())
}

fn confirm_delete(title: &str) -> Result<bool> {
    let can_prompt = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    if !can_prompt {
        bail!("refusing to delete without confirmation; pass --yes");
    }
    Confirm::new()
        .with_prompt(format!("Are you sure you want to delete \"{title}\"?"))
        .default(false)
        .interact()
        .context("failed to read confirmation")
}

pub async fn run_delete(config: &ClientConfig, id: &str, yes: bool) -> Result<()> {
    let mut session = Session::open(config).await?;
    let id = CaseId::new(id);
    let wb = &mut session.workbench;

    wb.request_delete(&id);
    if let Some(case) = wb.store.get(&id) {
        if !yes && !confirm_delete(&case.case_title)? {
            wb.cancel_delete();
            println!("Cancelled.");
            return Ok(());
        }
    }

    let mut notes: Vec<StateNote> = wb.confirm_delete().into_iter().collect();
    notes.extend(session.run().await);
    if let Some(err) = session.workbench.detail.error_for(&id) {
        bail!("{}", err.message);
    }
    if notes.contains(&StateNote::AlreadyDeleted(id.clone())) {
        println!("Case {id} was already deleted.");
    } else {
        println!("Case {id} deleted.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(notes: Option<&str>, notes_file: Option<std::path::PathBuf>) -> CreateArgs {
        CreateArgs {
            title: "Sepsis".into(),
            age: "72".into(),
            gender: "female".into(),
            notes: notes.map(str::to_string),
            notes_file,
        }
    }

    #[test]
    fn inline_notes_win_over_file() {
        let draft = draft_from_args(args(Some("inline"), Some("/nonexistent".into()))).unwrap();
        assert_eq!(draft.clinical_notes, "inline");
        assert_eq!(draft.gender, "female");
    }

    #[test]
    fn notes_are_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Fever 39.4C, lactate 4.1").unwrap();
        let draft = draft_from_args(args(None, Some(path))).unwrap();
        assert_eq!(draft.clinical_notes, "Fever 39.4C, lactate 4.1");
    }

    #[test]
    fn unreadable_notes_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = draft_from_args(args(None, Some(dir.path().join("missing.txt")))).unwrap_err();
        assert!(err.to_string().contains("Failed to read notes"));
    }

    #[test]
    fn missing_notes_leave_field_empty_for_validation() {
        let draft = draft_from_args(args(None, None)).unwrap();
        assert!(draft.clinical_notes.is_empty());
    }
}
