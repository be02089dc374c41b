//! foto-report: batch photo-report engine.
//!
//! Pipeline: a spreadsheet template is analyzed for photo placeholders
//! ([`template`]), photo references are resolved to bytes ([`source`]),
//! placements are planned deterministically ([`planner`]), images are
//! embedded into a fresh workbook ([`composer`]), and the whole batch is
//! orchestrated per job with progress/result records ([`job`]).

pub mod cli;
pub mod composer;
pub mod config;
pub mod error;
pub mod job;
pub mod planner;
pub mod source;
pub mod template;

pub use composer::{SavedReport, WorkbookComposer};
pub use config::EngineConfig;
pub use error::{ReportError, Result};
pub use job::{JobProgress, JobRequest, JobResult, JobRunner, JobStatus, JobStore, PhotoOutcome};
pub use planner::{Placement, PlacementPlan};
pub use source::{PhotoReference, PhotoSource, ResolvedPhoto};
pub use template::{PhotoCategory, SheetKind, TemplateStructure};
