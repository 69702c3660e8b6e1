//! `knotro` command-line entry point.
//!
//! # Responsibility
//! - Drive the note use-cases from a shell, including the administrative
//!   `get`/`del` operations that have no other entry point.
//! - Print every response envelope as pretty JSON on stdout.

use clap::{Parser, Subcommand};
use knotro_api::{ActionResponse, NoteApi};
use knotro_core::{AppConfig, NoteUpsert};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "knotro", version, about = "Personal wiki with backlinks")]
struct Cli {
    /// SQLite file holding the notes.
    #[arg(long, env = "KNOTRO_DB_PATH", global = true)]
    db: Option<PathBuf>,

    #[arg(long, env = "KNOTRO_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Directory for rolling log files; logging stays off when unset.
    #[arg(long, env = "KNOTRO_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[arg(long, env = "KNOTRO_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a note, creating it when missing.
    Read { name: String },
    /// Read a note only if it is public.
    Public { name: String },
    /// Save a note and reconcile backlinks. Content is read from stdin when
    /// `--content` is omitted.
    Put {
        name: String,
        #[arg(long)]
        content: Option<String>,
        /// Outgoing link; repeatable. Links are derived from `[[wikilinks]]`
        /// when none are given.
        #[arg(long = "link")]
        links: Vec<String>,
        /// Save with an explicitly empty link list.
        #[arg(long, conflicts_with = "links")]
        no_links: bool,
        #[arg(long)]
        public: Option<bool>,
    },
    /// Make a note public, or private with `--private`.
    Publish {
        name: String,
        #[arg(long)]
        private: bool,
    },
    /// Names of notes whose name or content contains the term.
    Search { term: String },
    /// Most recently saved note names.
    Recent,
    /// Name of today's daily note.
    Home,
    /// Administrative lookup that never creates a note.
    Get { name: String },
    /// Administrative delete.
    Del { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let api = NoteApi::new(resolve_config(&cli));

    let log_error = api.init_logging();
    if !log_error.is_empty() {
        eprintln!("knotro: logging disabled: {log_error}");
    }

    match run(&api, cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("knotro: {err}");
            ExitCode::from(2)
        }
    }
}

fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone();
    }
    config
}

/// Returns whether the operation succeeded.
fn run(api: &NoteApi, command: Command) -> Result<bool, String> {
    match command {
        Command::Read { name } => {
            let response = api.read_note(&name);
            print_json(&response)?;
            Ok(response.note.is_some())
        }
        Command::Public { name } => {
            let response = api.read_public_note(&name);
            print_json(&response)?;
            Ok(response.note.is_some())
        }
        Command::Put {
            name,
            content,
            links,
            no_links,
            public,
        } => {
            let content = match content {
                Some(content) => content,
                None => read_stdin()?,
            };
            let links = if no_links {
                Some(Vec::new())
            } else if links.is_empty() {
                None
            } else {
                Some(links)
            };
            print_action(&api.upsert_note(NoteUpsert {
                name,
                content,
                links,
                is_public: public,
            }))
        }
        Command::Publish { name, private } => print_action(&api.set_public(&name, !private)),
        Command::Search { term } => {
            print_json(&api.search(&term))?;
            Ok(true)
        }
        Command::Recent => {
            print_json(&api.recent_notes())?;
            Ok(true)
        }
        Command::Home => {
            println!("{}", api.home_note_name()?);
            Ok(true)
        }
        Command::Get { name } => {
            let response = api.admin_get(&name);
            print_json(&response)?;
            Ok(response.note.is_some())
        }
        Command::Del { name } => print_action(&api.admin_delete(&name)),
    }
}

fn print_action(response: &ActionResponse) -> Result<bool, String> {
    print_json(response)?;
    Ok(response.ok)
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| format!("cannot encode response: {err}"))?;
    println!("{text}");
    Ok(())
}

fn read_stdin() -> Result<String, String> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .map_err(|err| format!("cannot read content from stdin: {err}"))?;
    Ok(content)
}
