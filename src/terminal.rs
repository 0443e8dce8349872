// Interactive chat on stdin/stdout. One session for the life of the loop.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::chat::Role;
use crate::llm_interaction::LlmClient;
use crate::session::Session;

const HELP: &str = "Commands: /orders shows the order table, /quit leaves.";

pub fn format_orders(session: &Session) -> String {
    let mut table = format!("{:<10} {:<11} {:>8}\n", "order_id", "status", "total");
    for order in session.orders.iter() {
        table.push_str(&format!(
            "{:<10} {:<11} {:>8.2}\n",
            order.order_id,
            order.status.to_string(),
            order.total
        ));
    }
    table
}

/// Reads user lines until EOF or `/quit`; returns the finished session.
pub async fn run_chat<R, W>(llm: &LlmClient, input: R, mut output: W) -> Result<Session>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = Session::new();
    info!(session = %session.id, "Starting interactive chat session...");

    let mut greeting = String::new();
    for message in session.conversation.visible() {
        greeting.push_str(&format!("assistant> {}\n", message.content));
    }
    greeting.push_str(HELP);
    greeting.push('\n');
    output.write_all(greeting.as_bytes()).await.context("Failed to write to output")?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"you> ").await.context("Failed to write to output")?;
        output.flush().await.context("Failed to flush output")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let line = line.trim();

        let response = match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/orders" => format_orders(&session),
            _ => match session.handle_turn(llm, line).await {
                Ok(reply) => format!("assistant> {}\n", reply),
                Err(e) => {
                    error!(session = %session.id, "Turn failed: {:?}", e);
                    format!("error> {:#}\n", e)
                }
            },
        };
        output.write_all(response.as_bytes()).await.context("Failed to write to output")?;
    }

    let turns = session.conversation.messages().iter().filter(|m| m.role == Role::User).count();
    info!(session = %session.id, turns, "Chat session finished.");
    Ok(session)
}
