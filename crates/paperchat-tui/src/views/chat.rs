use std::path::PathBuf;

use paperchat_client::ApiClient;
use paperchat_types::{AskRequest, ChatEntry, StoredFile};

use crate::ui::typing::TypingEffect;

/// One document's transcript plus the question composer. The extracted PDF
/// text rides along with every question; losing it degrades answers but
/// never blocks asking.
#[derive(Default)]
pub struct ChatView {
    pub file: Option<StoredFile>,
    pub entries: Vec<ChatEntry>,
    pub selected: usize,
    pub question: String,
    pub asking: bool,
    pub notice: Option<String>,
    pub typing: TypingEffect,
    pub last_answer_id: Option<String>,
    pub pdf_text: String,
}

impl ChatView {
    /// Point the view at a document; `load` does the fetching on entry.
    pub fn prepare(&mut self, file: StoredFile) {
        self.file = Some(file);
        self.entries.clear();
        self.selected = 0;
        self.question.clear();
        self.notice = None;
        self.last_answer_id = None;
        self.pdf_text.clear();
    }

    pub async fn load(&mut self, client: &ApiClient) {
        let Some(file) = self.file.clone() else {
            return;
        };
        self.notice = None;

        match client.chat_history(&file.id).await {
            Ok(entries) => {
                self.entries = entries;
                self.selected = self.entries.len().saturating_sub(1);
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load chat history");
                self.notice = Some("Could not load previous chats".to_string());
            }
        }

        match fetch_pdf_text(&file.path).await {
            Ok(text) => self.pdf_text = text,
            Err(problem) => {
                tracing::warn!(file = %file.id, %problem, "pdf context unavailable");
                self.notice = Some("Failed to extract PDF text".to_string());
            }
        }
    }

    pub async fn ask(&mut self, client: &ApiClient) {
        if self.asking || self.question.trim().is_empty() {
            return;
        }
        let Some(file) = self.file.clone() else {
            return;
        };
        self.asking = true;
        self.notice = None;
        let req = AskRequest {
            question: self.question.trim().to_string(),
            pdf_text: self.pdf_text.clone(),
            file_id: file.id.clone(),
            file_title: file.title.clone(),
        };
        let result = client.ask(&req).await;
        self.asking = false;
        match result {
            Ok(entry) => {
                self.typing.begin(entry.answer.chars().count());
                self.last_answer_id = Some(entry.id.clone());
                self.entries.push(entry);
                self.selected = self.entries.len() - 1;
                self.question.clear();
            }
            Err(err) => {
                tracing::warn!(error = %err, "question failed");
                self.notice = Some(err.notice());
            }
        }
    }

    pub fn select_next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1).min(self.entries.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub async fn delete_selected(&mut self, client: &ApiClient) {
        let Some(entry) = self.entries.get(self.selected) else {
            return;
        };
        let id = entry.id.clone();
        match client.delete_chat(&id).await {
            Ok(()) => self.apply_deleted(&id),
            Err(err) => {
                self.notice = Some("Could not delete chat".to_string());
                tracing::warn!(error = %err, "chat delete failed");
            }
        }
    }

    /// Remove exactly the confirmed entry; everything else stays put.
    fn apply_deleted(&mut self, id: &str) {
        self.entries.retain(|e| e.id != id);
        if self.last_answer_id.as_deref() == Some(id) {
            self.last_answer_id = None;
            self.typing.skip();
        }
        if self.selected >= self.entries.len() && !self.entries.is_empty() {
            self.selected = self.entries.len() - 1;
        }
    }

    /// Write the whole transcript to a local text file and return its path.
    pub fn export(&self) -> Result<PathBuf, String> {
        if self.entries.is_empty() {
            return Err("Nothing to export".to_string());
        }
        let title = self
            .file
            .as_ref()
            .map(|f| f.title.as_str())
            .unwrap_or("chat");
        let dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let path = dir.join(format!("{}_chat_history.txt", sanitize_filename(title)));
        std::fs::write(&path, render_transcript(&self.entries))
            .map_err(|e| format!("Export failed: {}", e))?;
        Ok(path)
    }
}

/// The exported transcript body: every entry's question, answer and source.
pub fn render_transcript(entries: &[ChatEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "Question {}: {}\nAnswer: {}\nSource: {}\n\n",
            i + 1,
            entry.question,
            entry.answer,
            entry.source()
        ));
    }
    out
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

async fn fetch_pdf_text(url: &str) -> Result<String, String> {
    let resp = reqwest::get(url).await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("document fetch returned {}", resp.status()));
    }
    let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
    paperchat_document::extract_pdf_text_from_mem(&bytes, paperchat_document::DEFAULT_MAX_CHARS)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, q: &str, a: &str, source: &str) -> ChatEntry {
        ChatEntry {
            id: id.to_string(),
            question: q.to_string(),
            answer: a.to_string(),
            file_title: source.to_string(),
        }
    }

    #[test]
    fn transcript_contains_every_entry() {
        let entries = vec![
            entry("1", "What is this?", "A contract.", "Lease.pdf"),
            entry("2", "Who signs?", "Both parties.", ""),
        ];
        let out = render_transcript(&entries);
        assert!(out.contains("Question 1: What is this?"));
        assert!(out.contains("Answer: A contract."));
        assert!(out.contains("Source: Lease.pdf"));
        assert!(out.contains("Question 2: Who signs?"));
        assert!(out.contains("Source: unknown"));
    }

    #[test]
    fn delete_removes_exactly_the_confirmed_entry() {
        let mut view = ChatView::default();
        view.entries = vec![
            entry("1", "q1", "a1", "s"),
            entry("2", "q2", "a2", "s"),
            entry("3", "q3", "a3", "s"),
        ];
        view.selected = 2;
        view.apply_deleted("2");
        let ids: Vec<&str> = view.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(view.selected, 1);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_row() {
        // Unroutable address: the request fails, the list must not change.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut view = ChatView::default();
        view.entries = vec![entry("1", "q1", "a1", "s"), entry("2", "q2", "a2", "s")];
        view.selected = 0;
        view.delete_selected(&client).await;
        assert_eq!(view.entries.len(), 2);
        assert!(view.notice.is_some());
    }

    #[test]
    fn export_with_no_entries_is_refused() {
        let view = ChatView::default();
        assert!(view.export().is_err());
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("My Lease/2024"), "My_Lease_2024");
    }

    #[test]
    fn prepare_resets_prior_transcript() {
        let mut view = ChatView::default();
        view.entries.push(entry("1", "q", "a", "s"));
        view.question = "half-typed".to_string();
        view.prepare(StoredFile {
            id: "f2".to_string(),
            title: "Other".to_string(),
            path: "https://x/y.pdf".to_string(),
            created_at: None,
        });
        assert!(view.entries.is_empty());
        assert!(view.question.is_empty());
        assert_eq!(view.file.as_ref().unwrap().id, "f2");
    }
}
