/// `sparkq session` subcommands
use crate::client::{Client, ClientResult};
use clap::Subcommand;
use serde_json::json;

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Create a new session
    Create {
        /// Human-readable session name
        name: String,
    },
    /// List all sessions
    Ls,
    /// Mark a session as ended
    End {
        /// Session id
        id: String,
    },
    /// Delete a session and everything under it
    Rm {
        /// Session id
        id: String,
    },
}

pub async fn run(client: &Client, cmd: SessionCommand) -> ClientResult<serde_json::Value> {
    match cmd {
        SessionCommand::Create { name } => client.post("/api/sessions", &json!({ "name": name })).await,
        SessionCommand::Ls => client.get("/api/sessions").await,
        SessionCommand::End { id } => client.put(&format!("/api/sessions/{id}/end"), &json!({})).await,
        SessionCommand::Rm { id } => client.delete(&format!("/api/sessions/{id}")).await,
    }
}
