use std::path::PathBuf;

use paperchat_client::storage::validate_upload;
use paperchat_client::ApiClient;
use paperchat_types::{Session, StoredFile};

/// The uploaded-PDF list. Deletions keep their row visible (marked pending)
/// until the backend confirms.
#[derive(Default)]
pub struct WorkspaceView {
    pub files: Vec<StoredFile>,
    pub selected: usize,
    pub loading: bool,
    pub deleting: Option<String>,
    pub notice: Option<String>,
}

impl WorkspaceView {
    pub async fn load(&mut self, client: &ApiClient) {
        self.loading = true;
        self.notice = None;
        match client.list_files().await {
            Ok(files) => {
                self.files = files;
                if self.selected >= self.files.len() && !self.files.is_empty() {
                    self.selected = self.files.len() - 1;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load workspace files");
                self.notice = Some(err.notice());
            }
        }
        self.loading = false;
    }

    pub fn selected_file(&self) -> Option<&StoredFile> {
        self.files.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.files.is_empty() {
            self.selected = (self.selected + 1) % self.files.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.files.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.files.len() - 1);
        }
    }

    pub async fn delete_selected(&mut self, client: &ApiClient) {
        let Some(file) = self.selected_file() else {
            return;
        };
        if self.deleting.is_some() {
            return;
        }
        let id = file.id.clone();
        self.deleting = Some(id.clone());
        self.notice = None;
        match client.delete_file(&id).await {
            Ok(()) => {
                self.files.retain(|f| f.id != id);
                if self.selected >= self.files.len() && !self.files.is_empty() {
                    self.selected = self.files.len() - 1;
                }
            }
            Err(err) => {
                // Row stays; only the notice changes.
                self.notice = Some(err.notice());
            }
        }
        self.deleting = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    Title,
    Path,
}

/// The upload modal. All rejections happen client-side before any request
/// is built; only a fully valid form reaches the network.
#[derive(Default)]
pub struct UploadForm {
    pub open: bool,
    pub title: String,
    pub path: String,
    pub focus: Option<UploadField>,
    pub uploading: bool,
    pub notice: Option<String>,
}

impl UploadForm {
    pub fn focus(&self) -> UploadField {
        self.focus.unwrap_or(UploadField::Title)
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        if !self.open {
            self.notice = None;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.notice = None;
    }

    pub fn input(&mut self, c: char) {
        match self.focus() {
            UploadField::Title => self.title.push(c),
            UploadField::Path => self.path.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus() {
            UploadField::Title => {
                self.title.pop();
            }
            UploadField::Path => {
                self.path.pop();
            }
        }
    }

    pub fn next_field(&mut self) {
        self.focus = Some(match self.focus() {
            UploadField::Title => UploadField::Path,
            UploadField::Path => UploadField::Title,
        });
    }

    fn reset(&mut self) {
        self.title.clear();
        self.path.clear();
        self.focus = None;
        self.notice = None;
    }

    /// Returns true when the PDF was stored; the caller then refreshes the
    /// credential and invalidates the session so the credit meter moves.
    pub async fn submit(
        &mut self,
        client: &ApiClient,
        session: Option<&Session>,
        max_bytes: u64,
    ) -> bool {
        if self.uploading {
            return false;
        }
        self.notice = None;

        let path = PathBuf::from(self.path.trim());
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        if let Err(err) = validate_upload(session, self.title.trim(), &filename, size, max_bytes) {
            self.notice = Some(err.notice());
            return false;
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.notice = Some(format!("Cannot read {}: {}", path.display(), err));
                return false;
            }
        };

        self.uploading = true;
        let result = client.upload_pdf(self.title.trim(), &filename, bytes).await;
        self.uploading = false;
        match result {
            Ok(()) => {
                tracing::info!(title = %self.title.trim(), "pdf uploaded");
                self.reset();
                true
            }
            Err(err) => {
                self.notice = Some(err.notice());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn file(id: &str, title: &str) -> StoredFile {
        StoredFile {
            id: id.to_string(),
            title: title.to_string(),
            path: format!("https://files.example.com/{}.pdf", id),
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut view = WorkspaceView::default();
        view.files = vec![file("a", "A"), file("b", "B"), file("c", "C")];
        view.select_prev();
        assert_eq!(view.selected, 2);
        view.select_next();
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn selection_on_empty_list_is_inert() {
        let mut view = WorkspaceView::default();
        view.select_next();
        view.select_prev();
        assert_eq!(view.selected, 0);
        assert!(view.selected_file().is_none());
    }

    #[test]
    fn upload_form_reset_clears_everything() {
        let mut form = UploadForm::default();
        form.title = "Notes".to_string();
        form.path = "/tmp/notes.pdf".to_string();
        form.notice = Some("old".to_string());
        form.reset();
        assert!(form.title.is_empty());
        assert!(form.path.is_empty());
        assert!(form.notice.is_none());
    }
}
