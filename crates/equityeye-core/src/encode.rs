//! Document intake: validation and transport encoding.
//!
//! Size and type are checked before any bytes are read. A rejected file is
//! never opened, and encoding either yields a complete payload or nothing.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest document accepted, in bytes (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Extension to MIME type allow-list. Everything else is rejected.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
];

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("file is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// True for the pre-read rejections (oversized or unsupported type).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EncodeError::TooLarge { .. } | EncodeError::UnsupportedType(_)
        )
    }
}

/// An accepted document, encoded for inline transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    /// Base64 of the file bytes.
    pub data: String,
}

/// MIME type for a path, judged by extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Check size and type. Runs before anything is read.
pub fn validate(path: &Path, size: u64) -> Result<&'static str, EncodeError> {
    if size > MAX_FILE_SIZE {
        return Err(EncodeError::TooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    mime_for_path(path).ok_or_else(|| {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown");
        EncodeError::UnsupportedType(ext.to_string())
    })
}

/// Synchronous pre-flight check against the file on disk.
pub fn validate_path(path: &Path) -> Result<&'static str, EncodeError> {
    let meta = std::fs::metadata(path)?;
    validate(path, meta.len())
}

/// Read and encode an accepted document.
pub async fn encode_file(path: &Path) -> Result<UploadedFile, EncodeError> {
    let meta = tokio::fs::metadata(path).await?;
    let mime_type = validate(path, meta.len())?;

    let bytes = tokio::fs::read(path).await?;
    Ok(UploadedFile {
        name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string(),
        mime_type: mime_type.to_string(),
        data: STANDARD.encode(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_mime_for_accepted_extensions() {
        assert_eq!(
            mime_for_path(Path::new("term-sheet.pdf")),
            Some("application/pdf")
        );
        assert_eq!(mime_for_path(Path::new("scan.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("page.jpg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("page.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("page.webp")), Some("image/webp"));
    }

    #[test]
    fn test_mime_rejects_unknown_extensions() {
        assert_eq!(mime_for_path(Path::new("agreement.docx")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let err = validate(Path::new("big.pdf"), MAX_FILE_SIZE + 1).unwrap_err();
        assert!(matches!(err, EncodeError::TooLarge { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_accepts_file_at_limit() {
        assert_eq!(
            validate(Path::new("big.pdf"), MAX_FILE_SIZE).unwrap(),
            "application/pdf"
        );
    }

    #[test]
    fn test_validate_rejects_unsupported_type() {
        let err = validate(Path::new("agreement.docx"), 1024).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedType(_)));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_encode_round_trips_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("term-sheet.pdf");
        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        std::fs::write(&path, &bytes).unwrap();

        let file = encode_file(&path).await.unwrap();
        assert_eq!(file.name, "term-sheet.pdf");
        assert_eq!(file.mime_type, "application/pdf");

        let decoded = STANDARD.decode(&file.data).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[tokio::test]
    async fn test_encode_rejects_unsupported_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agreement.docx");
        std::fs::write(&path, b"not accepted").unwrap();

        let err = encode_file(&path).await.unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn test_encode_missing_file_is_an_io_error() {
        let err = encode_file(&PathBuf::from("/nonexistent/term-sheet.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, EncodeError::Io(_)));
        assert!(!err.is_validation());
    }
}
