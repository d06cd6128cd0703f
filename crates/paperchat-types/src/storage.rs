use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded PDF as the backend lists it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredFile {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// Remote URL of the stored document.
    pub path: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_missing_timestamp() {
        let f: StoredFile =
            serde_json::from_str(r#"{"_id":"f1","title":"Notes","path":"https://x/y.pdf"}"#)
                .unwrap();
        assert!(f.created_at.is_none());
    }
}
