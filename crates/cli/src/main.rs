mod cases;
mod config;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "clinicase",
    version,
    about = "Clinical case workbench - create, summarize, and browse patient cases"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cases, newest first
    List {
        /// Only show cases whose title contains this text
        #[arg(long)]
        search: Option<String>,

        /// Page to show (1-based, clamped to the last page)
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show a case and its summary
    Show {
        /// Case ID
        id: String,
    },

    /// Create a new case
    Create {
        #[arg(long)]
        title: String,

        /// Patient age in years (0-150)
        #[arg(long)]
        age: String,

        /// Male, Female or Other
        #[arg(long)]
        gender: String,

        /// Clinical notes text
        #[arg(long, conflicts_with = "notes_file")]
        notes: Option<String>,

        /// Read clinical notes from a file
        #[arg(long)]
        notes_file: Option<PathBuf>,
    },

    /// Generate (or regenerate) the AI summary for a case
    Summarize {
        /// Case ID
        id: String,
    },

    /// Delete a case
    Delete {
        /// Case ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show or set configuration
    Config {
        /// Set the server URL (including /api/v1)
        #[arg(long)]
        server: Option<String>,

        /// Set the request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Set the number of cases per listing page
        #[arg(long)]
        page_size: Option<usize>,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Config {
        server,
        timeout,
        page_size,
    } = cli.command
    {
        return if server.is_none() && timeout.is_none() && page_size.is_none() {
            config::show_config()
        } else {
            config::set_config(server, timeout, page_size)
        };
    }

    let cfg = config::load_config()?;
    tracing::debug!(server = %cfg.server.url, "using server");

    match cli.command {
        Commands::List { search, page } => cases::run_list(&cfg, search, page).await,
        Commands::Show { id } => cases::run_show(&cfg, &id).await,
        Commands::Create {
            title,
            age,
            gender,
            notes,
            notes_file,
        } => {
            cases::run_create(
                &cfg,
                cases::CreateArgs {
                    title,
                    age,
                    gender,
                    notes,
                    notes_file,
                },
            )
            .await
        }
        Commands::Summarize { id } => cases::run_summarize(&cfg, &id).await,
        Commands::Delete { id, yes } => cases::run_delete(&cfg, &id, yes).await,
        Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn notes_and_notes_file_conflict() {
        let parsed = Cli::try_parse_from([
            "clinicase", "create", "--title", "t", "--age", "1", "--gender", "Male", "--notes",
            "n", "--notes-file", "f.txt",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn list_defaults_to_first_page() {
        let cli = Cli::try_parse_from(["clinicase", "list", "--search", "chest"]).unwrap();
        match cli.command {
            Commands::List { search, page } => {
                assert_eq!(search.as_deref(), Some("chest"));
                assert_eq!(page, 1);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn config_accepts_server_flag() {
        let cli = Cli::try_parse_from(["clinicase", "config", "--server", "http://x/api/v1"])
            .unwrap();
        match cli.command {
            Commands::Config { server, .. } => {
                assert_eq!(server.as_deref(), Some("http://x/api/v1"))
            }
            _ => panic!("expected config"),
        }
    }
}
