//! # SparkQ CLI
//!
//! ```bash
//! sparkq session create "nightly build"
//! sparkq queue create sess_abc "lint" --instructions "run clippy"
//! sparkq task enqueue queue_abc run-bash '{"cmd":"cargo clippy"}'
//! ```

use clap::{Parser, Subcommand};
use sparkq_cli::client::Client;
use sparkq_cli::commands::{queue, session, task};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5005";

#[derive(Debug, Parser)]
#[command(name = "sparkq", version, about = "SparkQ task queue client")]
struct Cli {
    /// Base URL of a running SparkQ server
    #[arg(long, env = "SPARKQ_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage sessions
    Session {
        #[command(subcommand)]
        cmd: session::SessionCommand,
    },
    /// Manage queues
    Queue {
        #[command(subcommand)]
        cmd: queue::QueueCommand,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        cmd: task::TaskCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "sparkq_cli=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let client = Client::new(&cli.url);

    let result = match cli.command {
        Command::Session { cmd } => session::run(&client, cmd).await.map(Some),
        Command::Queue { cmd } => queue::run(&client, cmd).await.map(Some),
        Command::Task { cmd } => task::run(&client, cmd).await,
    };

    match result {
        Ok(Some(value)) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Ok(None) => {
            eprintln!("no task available");
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
