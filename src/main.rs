use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use taskpad::client::{MutationOutcome, TaskClient};
use taskpad::config::{AppConfig, ConfigOverrides};
use taskpad::model::TaskRecord;
use taskpad::server::{self, store::TaskStore, ServerContext};
use taskpad::ui::tui;

#[derive(Parser)]
#[command(
    name = "taskpad",
    about = "taskpad — task CRUD with a terminal front-end and HTTP server",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Task server port
    #[arg(long, env = "TASKPAD_PORT")]
    port: Option<u16>,

    /// Bind address for the server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKPAD_BIND")]
    bind_address: Option<String>,

    /// Base URL of the task server the client commands talk to
    #[arg(long, env = "TASKPAD_SERVER_URL")]
    server_url: Option<String>,

    /// Data directory for the SQLite database and config.toml
    #[arg(long, env = "TASKPAD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKPAD_LOG")]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the task server in the foreground.
    ///
    /// Examples:
    ///   taskpad serve
    ///   taskpad serve --port 4320 --bind-address 0.0.0.0
    Serve,
    /// Interactive terminal front-end (default when no subcommand given).
    Ui,
    /// Print all tasks.
    List,
    /// Create a task.
    ///
    /// Examples:
    ///   taskpad add "water plants" "the ficus first"
    Add {
        title: String,
        description: String,
    },
    /// Print one task as JSON.
    Show { id: i64 },
    /// Update fields of a task. Unspecified fields keep their stored value.
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a task. No confirmation.
    Rm { id: i64 },
}

fn init_logging(config: &AppConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(ConfigOverrides {
        port: args.port,
        bind_address: args.bind_address,
        server_url: args.server_url,
        data_dir: args.data_dir,
        log: args.log,
    });

    let command = args.command.unwrap_or(Command::Ui);

    // The TUI owns the terminal; it logs nowhere. Everything else gets the
    // standard subscriber.
    if !matches!(command, Command::Ui) {
        init_logging(&config);
    }

    match command {
        Command::Serve => serve(config).await,
        Command::Ui => tui::run_tui(&config).await,
        Command::List => cmd_list(&config).await,
        Command::Add { title, description } => cmd_add(&config, title, description).await,
        Command::Show { id } => cmd_show(&config, id).await,
        Command::Edit {
            id,
            title,
            description,
            status,
        } => cmd_edit(&config, id, title, description, status).await,
        Command::Rm { id } => cmd_rm(&config, id).await,
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let store = TaskStore::open(&config.data_dir)
        .await
        .context("could not open task database")?;
    info!(data_dir = %config.data_dir.display(), "task store ready");

    let ctx = Arc::new(ServerContext {
        config: Arc::new(config),
        store,
    });
    server::start_server(ctx).await
}

// ─── One-shot client commands ─────────────────────────────────────────────────

fn print_row(task: &TaskRecord) {
    println!(
        "{:>4}  {:<30}  {:<12}  {}",
        task.id().map(|id| id.to_string()).unwrap_or_default(),
        task.text("title"),
        task.text("status"),
        task.text("description"),
    );
}

/// Print the outcome of a create/update; validation failures go to stderr
/// and exit nonzero.
fn report_outcome(outcome: MutationOutcome) -> Result<()> {
    match outcome {
        MutationOutcome::Saved(task) => {
            print_row(&task);
            Ok(())
        }
        MutationOutcome::Rejected(errors) => {
            for (field, message) in &errors {
                eprintln!("{field}: {message}");
            }
            std::process::exit(1);
        }
    }
}

async fn cmd_list(config: &AppConfig) -> Result<()> {
    let client = TaskClient::new(config.server_url.clone());
    let tasks = client.list().await.context("could not list tasks")?;
    if tasks.is_empty() {
        println!("no tasks");
        return Ok(());
    }
    for task in &tasks {
        print_row(task);
    }
    Ok(())
}

async fn cmd_add(config: &AppConfig, title: String, description: String) -> Result<()> {
    let client = TaskClient::new(config.server_url.clone());
    let mut draft = TaskRecord::new();
    draft.set("title", title);
    draft.set("description", description);
    let outcome = client.create(&draft).await.context("could not create task")?;
    report_outcome(outcome)
}

async fn cmd_show(config: &AppConfig, id: i64) -> Result<()> {
    let client = TaskClient::new(config.server_url.clone());
    let task = client.get_one(id).await.context("could not fetch task")?;
    println!("{}", serde_json::to_string_pretty(task.fields())?);
    Ok(())
}

async fn cmd_edit(
    config: &AppConfig,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let client = TaskClient::new(config.server_url.clone());

    // Fetch-then-put: the update endpoint takes the full record.
    let mut task = client.get_one(id).await.context("could not fetch task")?;
    if let Some(title) = title {
        task.set("title", title);
    }
    if let Some(description) = description {
        task.set("description", description);
    }
    if let Some(status) = status {
        task.set("status", status);
    }

    let outcome = client.update(id, &task).await.context("could not update task")?;
    report_outcome(outcome)
}

async fn cmd_rm(config: &AppConfig, id: i64) -> Result<()> {
    let client = TaskClient::new(config.server_url.clone());
    client.delete(id).await.context("could not delete task")?;
    println!("deleted {id}");
    Ok(())
}
