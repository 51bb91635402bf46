use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use corolla_assistant::app::{App, SessionStorage};
use corolla_assistant::message::Role;
use corolla_assistant::{
    handler, logging, tui, ui, ChatSession, Config, FileStorage, MemoryStorage, QueryClient,
};

#[derive(Parser)]
#[command(name = "corolla")]
#[command(version, about = "Terminal chat client for the Corolla Assistant backend")]
struct Cli {
    /// Backend base URL (default http://localhost:8000, or $COROLLA_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Directory holding the stored conversation
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,
    /// Keep the conversation in memory only
    #[arg(long, global = true)]
    ephemeral: bool,
    /// Write logs here instead of beside the stored conversation
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
    /// Print the stored conversation
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_err) = Config::load_or_default();

    let storage_root = match cli.storage_dir.clone().or_else(|| config.storage_dir.clone()) {
        Some(dir) => dir,
        None => FileStorage::default_root()?,
    };
    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| logging::default_log_path(&storage_root));
    logging::init(&log_path)?;
    if let Some(err) = config_err {
        warn!(error = %format!("{err:#}"), "ignoring unreadable config, using defaults");
    }

    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    let client = QueryClient::new(&endpoint);
    info!(endpoint = %client.endpoint(), storage = %storage_root.display(), "starting");

    let storage: SessionStorage = if cli.ephemeral {
        Box::new(MemoryStorage::new())
    } else {
        Box::new(FileStorage::new(storage_root))
    };
    let mut session = ChatSession::open(storage);

    match cli.command {
        None => run_tui(App::new(session, client)).await?,
        Some(Commands::Ask { question }) => {
            session.set_draft(question);
            if session.submit(&client).await {
                if let Some(answer) = session.conversation().last() {
                    println!("{}", answer.content());
                }
            } else {
                eprintln!("Nothing to ask: the question is blank");
            }
        }
        Some(Commands::History) => print_history(&session),
    }

    Ok(())
}

fn print_history(session: &ChatSession<SessionStorage>) {
    if session.conversation().is_empty() {
        println!("No conversation stored yet.");
        return;
    }

    for msg in session.conversation() {
        let marker = match msg.role() {
            Role::User => ">",
            Role::Assistant => "<",
        };
        println!("{} {}:", marker, msg.role().label());
        println!("{}\n", msg.content());
    }
}

async fn run_tui(mut app: App) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    info!(messages = app.session.conversation().len(), "exiting");
    result
}
