use crate::{
    Result,
    dify::{ChatMessageRequest, DifyApi},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct ChatInput {
    pub user_message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub conversation_id: String,
    pub answer: String,
}

/// Forwards one chat turn to the Dify chat app.
pub async fn relay(dify: &dyn DifyApi, input: ChatInput, user: &str) -> Result<ChatReply> {
    let request = ChatMessageRequest::blocking(input.user_message, user, input.conversation_id);
    let response = dify.send_chat_message(request).await?;

    info!(
        "Chat turn answered in conversation {}",
        response.conversation_id
    );
    debug!(
        "Dify message id: {}",
        response.message_id.as_deref().unwrap_or("none")
    );

    Ok(ChatReply {
        conversation_id: response.conversation_id,
        answer: response.answer.unwrap_or_default(),
    })
}
