//! Error types for the report engine.
//!
//! Two classes matter to the job runner: recoverable per-photo errors
//! (recorded as a failed placement, the batch continues) and fatal errors
//! (the whole job terminates as failed).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("template unreadable: {0}")]
    TemplateUnreadable(String),

    #[error("template has no worksheets: {0}")]
    TemplateEmpty(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported photo url: {0}")]
    UnsupportedUrl(String),

    #[error("download timed out: {0}")]
    DownloadTimeout(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("image decode error: {0}")]
    ImageDecode(String),

    #[error("workbook compose error: {0}")]
    Compose(String),

    #[error("workbook save failed: {0}")]
    SaveFailed(String),

    #[error("job timed out after {0} seconds")]
    JobTimeout(u64),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Per-photo failures that must not abort the batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReportError::FileNotFound(_)
                | ReportError::UnsupportedUrl(_)
                | ReportError::DownloadTimeout(_)
                | ReportError::DownloadFailed(_)
                | ReportError::ImageDecode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ReportError::TemplateUnreadable("broken.xlsx".to_string());
        assert_eq!(format!("{}", error), "template unreadable: broken.xlsx");

        let error = ReportError::SaveFailed("disk full".to_string());
        assert!(format!("{}", error).contains("save failed"));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: ReportError = io_error.into();
        assert!(matches!(error, ReportError::Io(_)));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(ReportError::FileNotFound("x.jpg".into()).is_recoverable());
        assert!(ReportError::DownloadTimeout("http://x".into()).is_recoverable());
        assert!(ReportError::DownloadFailed("404".into()).is_recoverable());
        assert!(ReportError::UnsupportedUrl("ftp://x".into()).is_recoverable());
        assert!(ReportError::ImageDecode("bad jpeg".into()).is_recoverable());

        assert!(!ReportError::TemplateUnreadable("t.xlsx".into()).is_recoverable());
        assert!(!ReportError::TemplateEmpty("t.xlsx".into()).is_recoverable());
        assert!(!ReportError::SaveFailed("denied".into()).is_recoverable());
        assert!(!ReportError::JobTimeout(900).is_recoverable());
    }
}
