use serde::{Deserialize, Serialize};

/// One question/answer exchange in a document's transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default, rename = "fileTitle")]
    pub file_title: String,
}

impl ChatEntry {
    pub fn source(&self) -> &str {
        if self.file_title.is_empty() {
            "unknown"
        } else {
            &self.file_title
        }
    }
}

/// Question payload. `pdf_text` is the locally extracted document context;
/// the backend answers from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(rename = "userQuestion")]
    pub question: String,
    #[serde(rename = "pdfText")]
    pub pdf_text: String,
    #[serde(rename = "fileId")]
    pub file_id: String,
    #[serde(rename = "fileTitle")]
    pub file_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_falls_back_to_unknown() {
        let entry = ChatEntry {
            id: "c1".to_string(),
            question: "q".to_string(),
            answer: "a".to_string(),
            file_title: String::new(),
        };
        assert_eq!(entry.source(), "unknown");
    }

    #[test]
    fn ask_request_uses_backend_field_names() {
        let req = AskRequest {
            question: "What is this?".to_string(),
            pdf_text: "body".to_string(),
            file_id: "f1".to_string(),
            file_title: "Notes".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["userQuestion"], "What is this?");
        assert_eq!(json["fileId"], "f1");
    }
}
