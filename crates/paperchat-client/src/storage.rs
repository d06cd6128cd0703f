use paperchat_types::{Session, StoredFile};

use crate::error::{ClientError, Result};
use crate::http::{ApiClient, ListBody};

pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Client-side pre-flight for a PDF upload. Runs before any request is
/// built; a `Validation` error here means zero network traffic.
pub fn validate_upload(
    session: Option<&Session>,
    title: &str,
    filename: &str,
    size: u64,
    max_bytes: u64,
) -> Result<()> {
    let Some(session) = session else {
        return Err(ClientError::Validation(
            "You must be logged in to upload".to_string(),
        ));
    };
    if !session.can_upload() {
        return Err(ClientError::Validation(
            "No credits left".to_string(),
        ));
    }
    if title.trim().is_empty() {
        return Err(ClientError::Validation(
            "Please provide a title".to_string(),
        ));
    }
    if filename.trim().is_empty() || size == 0 {
        return Err(ClientError::Validation(
            "Please select a PDF file".to_string(),
        ));
    }
    if size > max_bytes {
        return Err(ClientError::Validation(format!(
            "PDF size must be {} MB or less",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

impl ApiClient {
    pub async fn list_files(&self) -> Result<Vec<StoredFile>> {
        let body: ListBody<StoredFile> = self.get_json("/api/storage/all").await?;
        Ok(body.into_vec())
    }

    pub async fn upload_pdf(&self, title: &str, filename: &str, bytes: Vec<u8>) -> Result<()> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("title", title.to_string())
            .part("path", part);
        self.post_multipart_empty("/api/storage/create", form).await
    }

    pub async fn delete_file(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/storage/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperchat_types::Role;

    fn session(credit: u32, used: u32) -> Session {
        Session {
            id: "u1".to_string(),
            fullname: "U".to_string(),
            email: "u@example.com".to_string(),
            role: Role::User,
            credit,
            used_credits: used,
            image: None,
        }
    }

    #[test]
    fn exhausted_credits_are_rejected_before_any_request() {
        let s = session(5, 5);
        let err = validate_upload(Some(&s), "Notes", "notes.pdf", 1024, MAX_UPLOAD_BYTES)
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(err.notice(), "No credits left");
    }

    #[test]
    fn missing_title_is_rejected() {
        let s = session(5, 0);
        let err =
            validate_upload(Some(&s), "  ", "notes.pdf", 1024, MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.notice(), "Please provide a title");
    }

    #[test]
    fn empty_file_is_rejected() {
        let s = session(5, 0);
        assert!(validate_upload(Some(&s), "Notes", "notes.pdf", 0, MAX_UPLOAD_BYTES).is_err());
        assert!(validate_upload(Some(&s), "Notes", "", 10, MAX_UPLOAD_BYTES).is_err());
    }

    #[test]
    fn oversized_file_is_rejected() {
        let s = session(5, 0);
        let err = validate_upload(
            Some(&s),
            "Notes",
            "notes.pdf",
            MAX_UPLOAD_BYTES + 1,
            MAX_UPLOAD_BYTES,
        )
        .unwrap_err();
        assert_eq!(err.notice(), "PDF size must be 2 MB or less");
    }

    #[test]
    fn valid_upload_passes() {
        let s = session(5, 4);
        assert!(validate_upload(Some(&s), "Notes", "notes.pdf", 1024, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn anonymous_upload_is_rejected() {
        assert!(validate_upload(None, "Notes", "notes.pdf", 1024, MAX_UPLOAD_BYTES).is_err());
    }
}
