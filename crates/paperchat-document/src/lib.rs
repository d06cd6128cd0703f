use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

/// Characters of extracted text sent along with a chat question. Anything
/// past this is the backend's problem, not the wire's.
pub const DEFAULT_MAX_CHARS: usize = 200_000;

fn truncate_output(s: String, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s;
    }
    let mut out = String::with_capacity(max_chars + 64);
    for (i, ch) in s.chars().enumerate() {
        if i >= max_chars {
            break;
        }
        out.push(ch);
    }
    out.push_str("\n\n...[truncated]...\n");
    out
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Extract plain text from PDF bytes already in memory (e.g. a downloaded
/// document), capped at `max_chars`.
pub fn extract_pdf_text_from_mem(bytes: &[u8], max_chars: usize) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| DocumentError::ExtractionFailed(e.to_string()))?;
    Ok(truncate_output(text, max_chars))
}

/// Extract plain text from a local PDF, capped at `max_chars`.
pub fn extract_pdf_text(path: &Path, max_chars: usize) -> Result<String> {
    if !path.exists() {
        return Err(DocumentError::NotFound(path.display().to_string()));
    }
    if !is_pdf(path) {
        return Err(DocumentError::InvalidDocument(format!(
            "Not a PDF file: {}",
            path.display()
        )));
    }

    let bytes = std::fs::read(path)?;
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| DocumentError::ExtractionFailed(format!("{:?}: {}", path, e)))?;
    Ok(truncate_output(text, max_chars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn truncation_appends_marker() {
        let long = "a".repeat(50);
        let out = truncate_output(long, 10);
        assert!(out.starts_with("aaaaaaaaaa"));
        assert!(out.contains("...[truncated]..."));
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_output("hello".to_string(), 100), "hello");
    }

    #[test]
    fn zero_cap_yields_empty() {
        assert_eq!(truncate_output("hello".to_string(), 0), "");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = extract_pdf_text(Path::new("/no/such/file.pdf"), 100).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound(_)));
    }

    #[test]
    fn non_pdf_extension_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "plain text").unwrap();
        let err = extract_pdf_text(&path, 100).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDocument(_)));
    }
}
