//! Progress and result records, keyed by job id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job lifecycle. `Completed` and `Failed` are terminal; `Failed` is
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Analyzing,
    Processing,
    Saving,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Mutable progress record, overwritten on every step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    pub job_id: String,
    pub status: JobStatus,
    pub current: usize,
    pub total: usize,
    pub percent: u8,
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

impl JobProgress {
    pub fn new(job_id: impl Into<String>, total: usize) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Queued,
            current: 0,
            total,
            percent: 0,
            message: "queued".to_string(),
            updated_at: Utc::now(),
        }
    }

    pub fn update(&mut self, status: JobStatus, current: usize, message: impl Into<String>) {
        self.status = status;
        self.current = current;
        self.percent = phase_percent(status, current, self.total);
        self.message = message.into();
        self.updated_at = Utc::now();
    }
}

/// Percentage across the whole job: analysis and saving get fixed bands,
/// photo processing scales between them.
fn phase_percent(status: JobStatus, current: usize, total: usize) -> u8 {
    match status {
        JobStatus::Queued => 0,
        JobStatus::Analyzing => 5,
        JobStatus::Processing => {
            if total == 0 {
                80
            } else {
                let span = 70.0 * (current.min(total) as f64 / total as f64);
                (10.0 + span).round() as u8
            }
        }
        JobStatus::Saving => 90,
        JobStatus::Completed => 100,
        JobStatus::Failed => 100,
    }
}

/// Outcome for one input photo. Exactly one per input, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoOutcome {
    pub file_name: String,
    pub success: bool,
    /// Sheet name for a placed photo.
    pub sheet: Option<String>,
    pub row: Option<u32>,
    pub col: Option<u32>,
    pub overflow: bool,
    pub error: Option<String>,
}

/// Terminal record, written exactly once when the job ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub success: bool,
    pub file_name: Option<String>,
    pub download_path: Option<String>,
    pub processed_photos: Vec<PhotoOutcome>,
    pub total_processed: usize,
    pub successful_placements: usize,
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl JobResult {
    pub fn failure(job_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            success: false,
            file_name: None,
            download_path: None,
            processed_photos: Vec::new(),
            total_processed: 0,
            successful_placements: 0,
            error: Some(error.into()),
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn test_progress_percent_bands() {
        let mut p = JobProgress::new("job-1", 4);
        assert_eq!(p.percent, 0);

        p.update(JobStatus::Analyzing, 0, "analyzing template");
        assert_eq!(p.percent, 5);

        p.update(JobStatus::Processing, 2, "resolved 2/4");
        assert_eq!(p.percent, 45);

        p.update(JobStatus::Processing, 4, "resolved 4/4");
        assert_eq!(p.percent, 80);

        p.update(JobStatus::Saving, 4, "saving workbook");
        assert_eq!(p.percent, 90);

        p.update(JobStatus::Completed, 4, "done");
        assert_eq!(p.percent, 100);
    }

    #[test]
    fn test_progress_zero_photos() {
        let mut p = JobProgress::new("job-1", 0);
        p.update(JobStatus::Processing, 0, "no photos");
        assert_eq!(p.percent, 80);
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let back: JobStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(back, JobStatus::Failed);
    }

    #[test]
    fn test_failure_result_shape() {
        let result = JobResult::failure("job-9", "template unreadable: t.xlsx");
        assert!(!result.success);
        assert!(result.file_name.is_none());
        assert!(result.processed_photos.is_empty());
        assert_eq!(result.error.as_deref(), Some("template unreadable: t.xlsx"));
    }
}
