// One user's conversation: its own order table and transcript. Created when a
// client connects, dropped when it leaves.

use anyhow::Result;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::chat::{Conversation, Role};
use crate::commands::{Command, TOOL_DECLARATIONS};
use crate::constants::FALLBACK_REPLY;
use crate::llm_interaction::{LlmClient, ModelReply};
use crate::orders::OrderStore;

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub orders: OrderStore,
    pub conversation: Conversation,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session with the demo orders and the greeting.
    pub fn new() -> Self {
        Self::with_orders(OrderStore::demo())
    }

    pub fn with_orders(orders: OrderStore) -> Self {
        Self {
            id: Uuid::new_v4(),
            orders,
            conversation: Conversation::new(),
        }
    }

    /// Runs one turn and returns the assistant's reply.
    ///
    /// Tool results become the reply directly; they are not sent back to the
    /// model. If the model call fails the user message is dropped again, so
    /// the transcript only holds completed turns.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn handle_turn(&mut self, llm: &LlmClient, user_input: &str) -> Result<String> {
        let mark = self.conversation.len();
        self.conversation.push(Role::User, user_input);

        let reply = match llm.complete(self.conversation.messages(), &TOOL_DECLARATIONS).await {
            Ok(reply) => reply,
            Err(e) => {
                self.conversation.truncate(mark);
                return Err(e);
            }
        };

        let final_reply = match reply {
            ModelReply::ToolCalls(calls) => {
                let results: Vec<String> = calls
                    .iter()
                    .map(|call| {
                        let command = Command::from_tool_call(call);
                        info!(?command, "Executing tool call");
                        command.execute(&mut self.orders)
                    })
                    .collect();
                results.join("\n")
            }
            ModelReply::Text(Some(text)) if !text.is_empty() => text,
            ModelReply::Text(_) => FALLBACK_REPLY.to_string(),
        };

        self.conversation.push(Role::Assistant, final_reply.as_str());
        Ok(final_reply)
    }
}
