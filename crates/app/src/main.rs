//! Launchpad - launcher layout manager
//!
//! Command-line front end over the launcher store. Every command loads the
//! saved layout, reconciles it against a fresh program scan, and prints the
//! result; mutating commands save before exiting.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use launchpad_core::{Entry, LauncherConfig, LauncherStore, Mutation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod actor;
mod platform;
mod render;

use actor::StoreHandle;

#[derive(Parser)]
#[command(name = "launchpad", version, about = "Arrange installed programs into pages and folders")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the launcher grid
    List {
        /// Only this page (1-based)
        #[arg(long)]
        page: Option<usize>,
    },
    /// Search programs by name, path or package id
    Search { query: Vec<String> },
    /// List folders by name
    Folders,
    /// Show a folder's programs
    Folder { folder_id: String },
    /// Group programs into a new folder
    CreateFolder {
        #[arg(long)]
        name: Option<String>,
        #[arg(required = true, num_args = 2..)]
        program_ids: Vec<String>,
    },
    RenameFolder { folder_id: String, name: String },
    /// Move a program into a folder
    Add { program_id: String, folder_id: String },
    /// Take a program out of a folder
    Remove { program_id: String, folder_id: String },
    /// Replace a folder with its programs
    Dissolve { folder_id: String },
    /// Move an entry (`app:<id>` or `folder:<id>`) before another
    Move { dragged: String, before: String },
    /// Drop one entry onto another
    Drop { dragged: String, target: String },
    /// Pull a program out of its folder to the end of the grid
    TopLevel { program_id: String },
    /// Rescan installed programs
    Refresh,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_path = match cli.config {
        Some(path) => path,
        None => LauncherConfig::default_path()?,
    };
    let config = LauncherConfig::load_or_default(&config_path)?;
    platform::log_platform_info(&config);

    let handle = StoreHandle::spawn(LauncherStore::from_config(&config)?);
    let snapshot = handle.bootstrap().await?;

    let mutation = match cli.command {
        Command::List { page } => {
            print!("{}", render::render_pages(&snapshot, page));
            None
        }
        Command::Search { query } => {
            let snapshot = handle.set_search_query(query.join(" ")).await?;
            print!("{}", render::render_programs(&snapshot.search_results));
            None
        }
        Command::Folders => {
            print!("{}", render::render_folders(&snapshot.folders));
            None
        }
        Command::Folder { folder_id } => {
            match handle.folder_contents(folder_id.as_str()).await? {
                Some(folder) => print!("{}", render::render_folder(&folder)),
                None => return Err(format!("No folder {}", folder_id).into()),
            }
            None
        }
        Command::Refresh => {
            let snapshot = handle.refresh().await?;
            print!("{}", render::render_pages(&snapshot, None));
            None
        }
        Command::CreateFolder { name, program_ids } => Some(Mutation::CreateFolder {
            name: name.unwrap_or_else(|| config.default_folder_name.clone()),
            program_ids,
        }),
        Command::RenameFolder { folder_id, name } => Some(Mutation::RenameFolder { folder_id, name }),
        Command::Add { program_id, folder_id } => Some(Mutation::AddAppToFolder { program_id, folder_id }),
        Command::Remove { program_id, folder_id } => {
            Some(Mutation::RemoveAppFromFolder { program_id, folder_id })
        }
        Command::Dissolve { folder_id } => Some(Mutation::DissolveFolder { folder_id }),
        Command::Move { dragged, before } => Some(Mutation::MoveEntry {
            dragged: dragged.parse::<Entry>()?,
            before: before.parse::<Entry>()?,
        }),
        Command::Drop { dragged, target } => Some(Mutation::HandleDrop {
            dragged: dragged.parse::<Entry>()?,
            target: target.parse::<Entry>()?,
        }),
        Command::TopLevel { program_id } => Some(Mutation::EnsureAppOnTopLevel { program_id }),
    };

    if let Some(mutation) = mutation {
        if !handle.apply(mutation).await? {
            eprintln!("Nothing changed");
        }
        let snapshot = handle.snapshot().await?;
        print!("{}", render::render_pages(&snapshot, None));
    }

    let snapshot = handle.snapshot().await?;
    if let Some(error) = snapshot.last_error {
        eprintln!("warning: {}", error);
    }
    Ok(())
}
