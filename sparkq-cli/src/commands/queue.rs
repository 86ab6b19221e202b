/// `sparkq queue` subcommands
use crate::client::{Client, ClientResult};
use clap::Subcommand;
use serde_json::json;

#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// Create a new queue within a session
    Create {
        /// Owning session id
        session_id: String,
        /// Queue name, unique among active queues in the session
        name: String,
        #[arg(long)]
        instructions: Option<String>,
        #[arg(long)]
        model_profile: Option<String>,
    },
    /// List queues, optionally filtered
    Ls {
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Mark a queue as ended
    End {
        id: String,
    },
    /// Archive a queue, freeing its name for reuse
    Archive {
        id: String,
    },
    /// Unarchive a previously archived queue
    Unarchive {
        id: String,
    },
    /// Delete a queue and its tasks
    Rm {
        id: String,
    },
}

pub async fn run(client: &Client, cmd: QueueCommand) -> ClientResult<serde_json::Value> {
    match cmd {
        QueueCommand::Create { session_id, name, instructions, model_profile } => {
            client
                .post(
                    "/api/queues",
                    &json!({
                        "session_id": session_id,
                        "name": name,
                        "instructions": instructions,
                        "model_profile": model_profile,
                    }),
                )
                .await
        }
        QueueCommand::Ls { session_id, status } => {
            let mut path = "/api/queues".to_string();
            let mut params = Vec::new();
            if let Some(session_id) = session_id {
                params.push(format!("session_id={session_id}"));
            }
            if let Some(status) = status {
                params.push(format!("status={status}"));
            }
            if !params.is_empty() {
                path.push('?');
                path.push_str(&params.join("&"));
            }
            client.get(&path).await
        }
        QueueCommand::End { id } => client.put(&format!("/api/queues/{id}/end"), &json!({})).await,
        QueueCommand::Archive { id } => client.put(&format!("/api/queues/{id}/archive"), &json!({})).await,
        QueueCommand::Unarchive { id } => client.put(&format!("/api/queues/{id}/unarchive"), &json!({})).await,
        QueueCommand::Rm { id } => client.delete(&format!("/api/queues/{id}")).await,
    }
}
