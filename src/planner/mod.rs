//! Placement planning.
//!
//! Deterministic matching of resolved photos to template slots. Photos are
//! consumed in input order; placeholders in (sheet, row, column) order. Each
//! photo takes the first free placeholder of its own or the general category,
//! then the first free placeholder of any category, then an overflow slot
//! appended below the last used row of the last relevant sheet. Failed
//! resolutions become per-photo failures in the plan, never an abort.

pub mod layout;

use crate::error::ReportError;
use crate::source::ResolvedPhoto;
use crate::template::{categorize, ExistingImage, PhotoCategory, TemplateStructure};
use self::layout::{
    region_px, scaled_size, FALLBACK_REGION_COLS, FALLBACK_REGION_ROWS, OVERFLOW_GAP_ROWS,
    OVERFLOW_REGION_COLS, OVERFLOW_REGION_ROWS,
};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// One photo bound to one workbook position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Index into the job's photo batch.
    pub photo_index: usize,
    pub sheet_index: usize,
    pub row: u32,
    pub col: u32,
    /// Embedded size after aspect-preserving fit.
    pub width_px: u32,
    pub height_px: u32,
    /// True when the photo landed in the overflow region.
    pub overflow: bool,
    /// Placeholder label, if placed at one.
    pub label: Option<String>,
}

/// A photo that could not be placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementFailure {
    pub photo_index: usize,
    pub file_name: String,
    pub error: String,
}

/// Output of the planner: placements plus per-photo failures, covering every
/// input photo exactly once.
#[derive(Debug, Clone, Default)]
pub struct PlacementPlan {
    pub placements: Vec<Placement>,
    pub failures: Vec<PlacementFailure>,
}

struct Slot {
    sheet_index: usize,
    row: u32,
    col: u32,
    region_rows: u32,
    region_cols: u32,
    category: PhotoCategory,
    label: String,
    used: bool,
}

/// Plan placements for a batch of resolution outcomes.
pub fn plan(
    structure: &TemplateStructure,
    photos: &[Result<ResolvedPhoto, ReportError>],
) -> PlacementPlan {
    let mut slots = collect_slots(structure);
    let overflow_sheet = overflow_sheet_index(structure);
    let mut overflow_row = overflow_start_row(structure, overflow_sheet);

    let mut plan = PlacementPlan::default();

    for (photo_index, outcome) in photos.iter().enumerate() {
        let photo = match outcome {
            Ok(p) => p,
            Err(e) => {
                plan.failures.push(PlacementFailure {
                    photo_index,
                    file_name: file_name_for(photos, photo_index),
                    error: e.to_string(),
                });
                continue;
            }
        };

        let (natural_w, natural_h) = match probe_dimensions(&photo.data) {
            Ok(dims) => dims,
            Err(e) => {
                plan.failures.push(PlacementFailure {
                    photo_index,
                    file_name: photo.file_name.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        let category = categorize(&photo.file_name);
        let placement = match pick_slot(&mut slots, category) {
            Some(slot) => {
                let (target_w, target_h) = region_px(slot.region_rows, slot.region_cols);
                let (width_px, height_px) = scaled_size(natural_w, natural_h, target_w, target_h);
                Placement {
                    photo_index,
                    sheet_index: slot.sheet_index,
                    row: slot.row,
                    col: slot.col,
                    width_px,
                    height_px,
                    overflow: false,
                    label: Some(slot.label.clone()),
                }
            }
            None => {
                let (target_w, target_h) = region_px(OVERFLOW_REGION_ROWS, OVERFLOW_REGION_COLS);
                let (width_px, height_px) = scaled_size(natural_w, natural_h, target_w, target_h);
                let row = overflow_row;
                overflow_row += OVERFLOW_REGION_ROWS + OVERFLOW_GAP_ROWS;
                Placement {
                    photo_index,
                    sheet_index: overflow_sheet,
                    row,
                    col: 0,
                    width_px,
                    height_px,
                    overflow: true,
                    label: None,
                }
            }
        };

        plan.placements.push(placement);
    }

    plan
}

fn file_name_for(photos: &[Result<ResolvedPhoto, ReportError>], index: usize) -> String {
    match &photos[index] {
        Ok(p) => p.file_name.clone(),
        Err(_) => format!("photo #{}", index + 1),
    }
}

/// All free slots in (sheet, row, column) order, skipping placeholders whose
/// region is already covered by an embedded image.
fn collect_slots(structure: &TemplateStructure) -> Vec<Slot> {
    let mut slots = Vec::new();

    for (sheet_index, sheet) in structure.worksheets.iter().enumerate() {
        for placeholder in &sheet.placeholders {
            let (region_rows, region_cols) = match sheet.merged_at(placeholder.row, placeholder.col)
            {
                Some(m) => (m.rows(), m.cols()),
                None => (FALLBACK_REGION_ROWS, FALLBACK_REGION_COLS),
            };

            let covered = sheet.images.iter().any(|img| {
                overlaps(
                    placeholder.row,
                    placeholder.col,
                    region_rows,
                    region_cols,
                    img,
                )
            });
            if covered {
                continue;
            }

            slots.push(Slot {
                sheet_index,
                row: placeholder.row,
                col: placeholder.col,
                region_rows,
                region_cols,
                category: placeholder.category,
                label: placeholder.label.clone(),
                used: false,
            });
        }
    }

    slots
}

fn overlaps(row: u32, col: u32, rows: u32, cols: u32, image: &ExistingImage) -> bool {
    let img_rows = image.height_px.div_ceil(layout::DEFAULT_ROW_HEIGHT_PX).max(1);
    let img_cols = image.width_px.div_ceil(layout::DEFAULT_COL_WIDTH_PX).max(1);

    let row_overlap = image.row < row + rows && row < image.row + img_rows;
    let col_overlap = image.col < col + cols && col < image.col + img_cols;
    row_overlap && col_overlap
}

/// Category-first, then first free slot of any category.
fn pick_slot(slots: &mut [Slot], category: PhotoCategory) -> Option<&Slot> {
    let by_category = slots.iter().position(|s| {
        !s.used && (s.category == category || s.category == PhotoCategory::General)
    });
    let index = by_category.or_else(|| slots.iter().position(|s| !s.used))?;
    slots[index].used = true;
    Some(&slots[index])
}

/// Overflow photos go to the last sheet that defines placeholders, or the
/// last sheet of the workbook when none do.
fn overflow_sheet_index(structure: &TemplateStructure) -> usize {
    structure
        .worksheets
        .iter()
        .rposition(|w| !w.placeholders.is_empty())
        .unwrap_or(structure.worksheets.len().saturating_sub(1))
}

fn overflow_start_row(structure: &TemplateStructure, sheet_index: usize) -> u32 {
    let sheet = match structure.worksheets.get(sheet_index) {
        Some(s) => s,
        None => return OVERFLOW_GAP_ROWS,
    };

    let image_bottom = sheet
        .images
        .iter()
        .map(|img| img.row + img.height_px.div_ceil(layout::DEFAULT_ROW_HEIGHT_PX).max(1))
        .max()
        .unwrap_or(0);

    sheet.rows.max(image_bottom) + OVERFLOW_GAP_ROWS
}

fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), ReportError> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ReportError::ImageDecode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ReportError::ImageDecode(e.to_string()))
}
