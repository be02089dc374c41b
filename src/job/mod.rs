//! Job orchestration.
//!
//! One job runs sequentially through analyze → resolve → plan → compose →
//! save, with photo resolution fanned out through a bounded pool. Progress is
//! written to the store after every step and the terminal result exactly
//! once. Per-photo failures never abort the batch; template and save failures
//! always do.

pub mod store;
pub mod types;

pub use self::store::JobStore;
pub use self::types::{JobProgress, JobResult, JobStatus, PhotoOutcome};

use crate::composer::WorkbookComposer;
use crate::config::EngineConfig;
use crate::error::{ReportError, Result};
use crate::planner;
use crate::source::{PhotoLocation, PhotoReference, PhotoSource, ResolvedPhoto};
use crate::template;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// One batch-processing request.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job_id: String,
    pub template: PathBuf,
    pub photos: Vec<PhotoReference>,
}

pub struct JobRunner {
    config: EngineConfig,
    store: Arc<JobStore>,
    source: PhotoSource,
}

impl JobRunner {
    pub fn new(config: EngineConfig, store: Arc<JobStore>) -> Self {
        Self {
            config,
            store,
            source: PhotoSource::new(),
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Run one job to its terminal state. Always produces a result record
    /// and always cleans up uploaded temp files.
    pub async fn run(&self, request: JobRequest) -> JobResult {
        let result = match self.execute(&request).await {
            Ok(result) => result,
            Err(e) => {
                let mut progress = self
                    .store
                    .get_progress(&request.job_id)
                    .unwrap_or_else(|| {
                        JobProgress::new(request.job_id.clone(), request.photos.len())
                    });
                progress.update(JobStatus::Failed, progress.current, e.to_string());
                self.store.put_progress(progress);
                JobResult::failure(request.job_id.clone(), e.to_string())
            }
        };

        cleanup_uploads(&request.photos);
        self.store.put_result(result.clone());
        result
    }

    async fn execute(&self, request: &JobRequest) -> Result<JobResult> {
        let total = request.photos.len();
        let deadline = Instant::now() + Duration::from_secs(self.config.job_timeout_secs);

        let progress = Mutex::new(JobProgress::new(request.job_id.clone(), total));
        let update = |status: JobStatus, current: usize, message: String| {
            let mut p = match progress.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            p.update(status, current, message);
            self.store.put_progress(p.clone());
        };

        update(JobStatus::Queued, 0, "queued".to_string());

        update(
            JobStatus::Analyzing,
            0,
            format!("analyzing template {}", request.template.display()),
        );
        let structure = template::analyze(&request.template, self.config.scan_row_limit)?;

        update(
            JobStatus::Processing,
            0,
            format!("resolving {} photos", total),
        );
        let resolved = self.resolve_batch(&request.photos, deadline, &update).await;

        let plan = planner::plan(&structure, &resolved);

        update(JobStatus::Saving, total, "composing workbook".to_string());
        let composer = WorkbookComposer::new(&self.config.output_dir, &self.config.report_slug);
        let mut workbook = composer.compose(&structure, &resolved, &plan)?;
        // Photo buffers are no longer needed once embedded; release them
        // before serialization, batches can hold hundreds of large images.
        drop(resolved);

        update(JobStatus::Saving, total, "saving workbook".to_string());
        let saved = composer.save(&mut workbook)?;

        let outcomes = build_outcomes(&request.photos, &structure, &plan);
        let successful_placements = plan.placements.len();

        update(
            JobStatus::Completed,
            total,
            format!("saved {}", saved.file_name),
        );

        Ok(JobResult {
            job_id: request.job_id.clone(),
            success: true,
            file_name: Some(saved.file_name),
            download_path: Some(saved.path.display().to_string()),
            processed_photos: outcomes,
            total_processed: total,
            successful_placements,
            error: None,
            finished_at: chrono::Utc::now(),
        })
    }

    /// Resolve the batch through a bounded pool, restoring input order.
    ///
    /// Fetches that have not started by the job deadline are recorded as
    /// timeouts so the job can proceed to composing with what it has.
    async fn resolve_batch(
        &self,
        photos: &[PhotoReference],
        deadline: Instant,
        update: &(impl Fn(JobStatus, usize, String) + Sync),
    ) -> Vec<std::result::Result<ResolvedPhoto, ReportError>> {
        let total = photos.len();
        let semaphore = Arc::new(Semaphore::new(self.config.fetch_concurrency.max(1)));
        let done = Arc::new(AtomicUsize::new(0));
        let batch_start = Instant::now();

        let futures = photos.iter().map(|reference| {
            let semaphore = Arc::clone(&semaphore);
            let done = Arc::clone(&done);
            async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err(ReportError::DownloadFailed("fetch pool closed".to_string()))
                    }
                };

                let outcome = if Instant::now() >= deadline {
                    Err(ReportError::DownloadTimeout(format!(
                        "job deadline reached before {}",
                        reference.file_name
                    )))
                } else {
                    self.source.resolve(reference, deadline).await
                };

                let current = done.fetch_add(1, Ordering::SeqCst) + 1;
                let eta = eta_seconds(batch_start.elapsed(), current, total);
                update(
                    JobStatus::Processing,
                    current,
                    match eta {
                        Some(secs) => {
                            format!("resolved {}/{} photos (~{}s left)", current, total, secs)
                        }
                        None => format!("resolved {}/{} photos", current, total),
                    },
                );

                outcome
            }
        });

        // join_all preserves input order regardless of completion order,
        // which the planner's determinism depends on.
        join_all(futures).await
    }
}

/// Remaining-time estimate from the running average per photo.
fn eta_seconds(elapsed: Duration, done: usize, total: usize) -> Option<u64> {
    if done == 0 || done >= total {
        return None;
    }
    let avg = elapsed.as_secs_f64() / done as f64;
    Some((avg * (total - done) as f64).ceil() as u64)
}

/// Uploaded temp files are deleted regardless of outcome.
fn cleanup_uploads(photos: &[PhotoReference]) {
    for reference in photos {
        if let PhotoLocation::Uploaded(path) = &reference.location {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// One outcome per input photo, success or failure, never dropped.
fn build_outcomes(
    photos: &[PhotoReference],
    structure: &template::TemplateStructure,
    plan: &planner::PlacementPlan,
) -> Vec<PhotoOutcome> {
    photos
        .iter()
        .enumerate()
        .map(|(index, reference)| {
            if let Some(placement) = plan.placements.iter().find(|p| p.photo_index == index) {
                let sheet = structure
                    .worksheets
                    .get(placement.sheet_index)
                    .map(|w| w.name.clone());
                PhotoOutcome {
                    file_name: reference.file_name.clone(),
                    success: true,
                    sheet,
                    row: Some(placement.row),
                    col: Some(placement.col),
                    overflow: placement.overflow,
                    error: None,
                }
            } else {
                let error = plan
                    .failures
                    .iter()
                    .find(|f| f.photo_index == index)
                    .map(|f| f.error.clone())
                    .unwrap_or_else(|| "photo not processed".to_string());
                PhotoOutcome {
                    file_name: reference.file_name.clone(),
                    success: false,
                    sheet: None,
                    row: None,
                    col: None,
                    overflow: false,
                    error: Some(error),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eta_seconds() {
        assert_eq!(eta_seconds(Duration::from_secs(10), 2, 4), Some(10));
        assert_eq!(eta_seconds(Duration::from_secs(10), 0, 4), None);
        assert_eq!(eta_seconds(Duration::from_secs(10), 4, 4), None);
    }

    #[test]
    fn test_cleanup_uploads_removes_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.jpg");
        let uploaded = dir.path().join("upload-123.jpg");
        std::fs::write(&kept, b"x").unwrap();
        std::fs::write(&uploaded, b"x").unwrap();

        let photos = vec![
            PhotoReference::local(&kept),
            PhotoReference::uploaded(&uploaded, "original.jpg"),
        ];
        cleanup_uploads(&photos);

        assert!(kept.exists());
        assert!(!uploaded.exists());
    }
}
