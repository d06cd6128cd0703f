use paperchat_types::{AskRequest, ChatEntry};
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::http::{ApiClient, Envelope};

#[derive(Deserialize)]
struct HistoryBody {
    #[serde(default)]
    chats: Vec<ChatEntry>,
}

impl ApiClient {
    pub async fn chat_history(&self, file_id: &str) -> Result<Vec<ChatEntry>> {
        let body: HistoryBody = self.get_json(&format!("/api/chat/{}", file_id)).await?;
        Ok(body.chats)
    }

    /// Post one question. The backend accepts a batch and answers in order;
    /// this client always sends exactly one.
    pub async fn ask(&self, req: &AskRequest) -> Result<ChatEntry> {
        let body: Envelope<Vec<ChatEntry>> = self.post_json("/api/chat/", &[req]).await?;
        body.data.into_iter().next().ok_or_else(|| {
            ClientError::Decode("chat response contained no entries".to_string())
        })
    }

    pub async fn delete_chat(&self, entry_id: &str) -> Result<()> {
        self.delete(&format!("/api/chat/{}", entry_id)).await
    }
}
