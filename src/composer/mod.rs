//! Workbook composition and saving.
//!
//! The template file is never mutated: its text content and merged regions
//! are rebuilt into a fresh workbook and the planned images are embedded at
//! their placement coordinates, each scaled to its region. Saving writes
//! `<slug>-<timestamp>-<random>.xlsx` into the output directory.

use crate::error::{ReportError, Result};
use crate::planner::{Placement, PlacementPlan};
use crate::source::ResolvedPhoto;
use crate::template::{TemplateStructure, WorksheetInfo};
use rand::distr::Alphanumeric;
use rand::Rng;
use rust_xlsxwriter::{Format, FormatBorder, Image, ObjectMovement, Workbook};
use std::path::PathBuf;

/// Handle to a saved report, retrievable by the caller.
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub file_name: String,
    pub path: PathBuf,
}

pub struct WorkbookComposer {
    output_dir: PathBuf,
    slug: String,
}

impl WorkbookComposer {
    pub fn new(output_dir: impl Into<PathBuf>, slug: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            slug: slug.into(),
        }
    }

    /// Rebuild the template content and embed the planned photos.
    pub fn compose(
        &self,
        structure: &TemplateStructure,
        photos: &[std::result::Result<ResolvedPhoto, ReportError>],
        plan: &PlacementPlan,
    ) -> Result<Workbook> {
        let mut workbook = Workbook::new();

        for sheet in &structure.worksheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .map_err(|e| ReportError::Compose(format!("sheet name {:?}: {}", sheet.name, e)))?;
            write_sheet_content(worksheet, sheet)?;
        }

        for placement in &plan.placements {
            let photo = match photos.get(placement.photo_index) {
                Some(Ok(p)) => p,
                _ => continue, // planner only emits placements for resolved photos
            };
            let worksheet = workbook
                .worksheet_from_index(placement.sheet_index)
                .map_err(|e| ReportError::Compose(format!("sheet #{}: {}", placement.sheet_index, e)))?;
            insert_photo(worksheet, placement, photo)?;
        }

        Ok(workbook)
    }

    /// Serialize the workbook to the output directory.
    pub fn save(&self, workbook: &mut Workbook) -> Result<SavedReport> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| ReportError::SaveFailed(format!("{}: {}", self.output_dir.display(), e)))?;

        let file_name = self.output_file_name();
        let path = self.output_dir.join(&file_name);

        workbook
            .save(&path)
            .map_err(|e| ReportError::SaveFailed(format!("{}: {}", path.display(), e)))?;

        Ok(SavedReport { file_name, path })
    }

    /// `<slug>-<timestamp>-<random>.xlsx`, collision-resistant across jobs.
    fn output_file_name(&self) -> String {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        format!("{}-{}-{}.xlsx", slug::slugify(&self.slug), stamp, suffix)
    }
}

fn write_sheet_content(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    sheet: &WorksheetInfo,
) -> Result<()> {
    let merged_format = Format::new().set_border(FormatBorder::Thin);

    // Merged regions first, carrying the text at their top-left corner;
    // writing into a merged cell afterwards would conflict.
    for range in &sheet.merged {
        let text = sheet
            .cells
            .iter()
            .find(|c| c.row == range.first_row && c.col == range.first_col)
            .map(|c| c.text.as_str())
            .unwrap_or("");
        worksheet
            .merge_range(
                range.first_row,
                range.first_col as u16,
                range.last_row,
                range.last_col as u16,
                text,
                &merged_format,
            )
            .map_err(|e| ReportError::Compose(format!("merge range: {}", e)))?;
    }

    for cell in &sheet.cells {
        if sheet.merged.iter().any(|m| m.contains(cell.row, cell.col)) {
            continue;
        }
        worksheet
            .write_string(cell.row, cell.col as u16, &cell.text)
            .map_err(|e| ReportError::Compose(format!("cell ({},{}): {}", cell.row, cell.col, e)))?;
    }

    Ok(())
}

fn insert_photo(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    placement: &Placement,
    photo: &ResolvedPhoto,
) -> Result<()> {
    let image = Image::new_from_buffer(&photo.data)
        .map_err(|e| ReportError::Compose(format!("{}: {}", photo.file_name, e)))?;

    let natural_w = image.width();
    let natural_h = image.height();
    let scale_w = if natural_w > 0.0 {
        placement.width_px as f64 / natural_w
    } else {
        1.0
    };
    let scale_h = if natural_h > 0.0 {
        placement.height_px as f64 / natural_h
    } else {
        1.0
    };

    let image = image
        .set_scale_width(scale_w)
        .set_scale_height(scale_h)
        .set_object_movement(ObjectMovement::DontMoveOrSizeWithCells);

    worksheet
        .insert_image_with_offset(placement.row, placement.col as u16, &image, 2, 2)
        .map_err(|e| ReportError::Compose(format!("{}: {}", photo.file_name, e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_output_file_name_format() {
        let composer = WorkbookComposer::new("/tmp/out", "Site 42 Report");
        let name = composer.output_file_name();
        let re = Regex::new(r"^site-42-report-\d{8}-\d{6}-[a-z0-9]{6}\.xlsx$").unwrap();
        assert!(re.is_match(&name), "unexpected file name: {}", name);
    }

    #[test]
    fn test_output_file_names_collide_rarely() {
        let composer = WorkbookComposer::new("/tmp/out", "report");
        let a = composer.output_file_name();
        let b = composer.output_file_name();
        // Same second, different random suffix.
        assert_ne!(a, b);
    }
}
