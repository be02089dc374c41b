//! Template analysis.
//!
//! Reads a spreadsheet template once per job and produces an immutable
//! structural map: worksheets, cell text, placeholder cells with inferred
//! categories, merged ranges and existing embedded images. The structure is
//! owned by the running job and never shared across jobs.

mod drawings;
mod keywords;

pub use self::keywords::{categorize, is_placeholder_text, sheet_kind, PhotoCategory, SheetKind};

use crate::error::{ReportError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A non-empty cell captured from the template's used range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellText {
    pub row: u32,
    pub col: u32,
    pub text: String,
}

/// A cell whose text marks a photo slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderCell {
    pub row: u32,
    pub col: u32,
    pub label: String,
    pub category: PhotoCategory,
}

/// A merged cell range (inclusive bounds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MergedRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl MergedRange {
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.first_row && row <= self.last_row && col >= self.first_col && col <= self.last_col
    }

    pub fn rows(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn cols(&self) -> u32 {
        self.last_col - self.first_col + 1
    }
}

/// An image already embedded in the template (anchor cell + pixel size).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingImage {
    pub row: u32,
    pub col: u32,
    pub width_px: u32,
    pub height_px: u32,
}

/// One worksheet of the analyzed template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetInfo {
    pub name: String,
    pub kind: SheetKind,
    pub rows: u32,
    pub cols: u32,
    pub cells: Vec<CellText>,
    pub placeholders: Vec<PlaceholderCell>,
    pub merged: Vec<MergedRange>,
    pub images: Vec<ExistingImage>,
}

impl WorksheetInfo {
    /// The merged range containing the given cell, if any.
    pub fn merged_at(&self, row: u32, col: u32) -> Option<&MergedRange> {
        self.merged.iter().find(|m| m.contains(row, col))
    }
}

/// Immutable result of analyzing one template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateStructure {
    pub source: PathBuf,
    pub worksheets: Vec<WorksheetInfo>,
}

impl TemplateStructure {
    pub fn placeholder_count(&self) -> usize {
        self.worksheets.iter().map(|w| w.placeholders.len()).sum()
    }
}

/// Analyze a template file.
///
/// Fails with `TemplateUnreadable` if the file cannot be parsed and
/// `TemplateEmpty` if it contains no worksheets. Placeholder scanning is
/// capped at `scan_row_limit` rows per sheet; cell text capture covers the
/// whole used range so the composer can reproduce the template.
pub fn analyze(path: &Path, scan_row_limit: u32) -> Result<TemplateStructure> {
    if !path.exists() {
        return Err(ReportError::TemplateUnreadable(format!(
            "{}: no such file",
            path.display()
        )));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| ReportError::TemplateUnreadable(format!("{}: {}", path.display(), e)))?;

    // Merged regions are layout hints; a workbook that fails to load them
    // is still analyzable, it just loses region sizing.
    let merged_loaded = workbook.load_merged_regions().is_ok();

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ReportError::TemplateEmpty(path.display().to_string()));
    }

    let images_by_sheet = drawings::extract(path, sheet_names.len());

    let mut worksheets = Vec::with_capacity(sheet_names.len());
    for (sheet_index, name) in sheet_names.iter().enumerate() {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| ReportError::TemplateUnreadable(format!("{}: {}", name, e)))?;

        let (height, width) = range.get_size();
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        let mut cells = Vec::new();
        let mut placeholders = Vec::new();

        for (r, row) in range.rows().enumerate() {
            let abs_row = start_row + r as u32;
            for (c, cell) in row.iter().enumerate() {
                let abs_col = start_col + c as u32;
                if matches!(cell, Data::Empty) {
                    continue;
                }
                let text = cell.to_string();
                if text.is_empty() {
                    continue;
                }
                if abs_row < scan_row_limit && is_placeholder_text(&text) {
                    placeholders.push(PlaceholderCell {
                        row: abs_row,
                        col: abs_col,
                        label: text.clone(),
                        category: categorize(&text),
                    });
                }
                cells.push(CellText {
                    row: abs_row,
                    col: abs_col,
                    text,
                });
            }
        }

        let merged = if merged_loaded {
            workbook
                .merged_regions_by_sheet(name)
                .into_iter()
                .map(|(_, _, dims)| MergedRange {
                    first_row: dims.start.0,
                    first_col: dims.start.1,
                    last_row: dims.end.0,
                    last_col: dims.end.1,
                })
                .collect()
        } else {
            Vec::new()
        };

        worksheets.push(WorksheetInfo {
            name: name.clone(),
            kind: sheet_kind(name),
            rows: start_row + height as u32,
            cols: start_col + width as u32,
            cells,
            placeholders,
            merged,
            images: images_by_sheet.get(sheet_index).cloned().unwrap_or_default(),
        });
    }

    Ok(TemplateStructure {
        source: path.to_path_buf(),
        worksheets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_missing_file() {
        let result = analyze(Path::new("/nonexistent/template.xlsx"), 100);
        assert!(matches!(result, Err(ReportError::TemplateUnreadable(_))));
    }

    #[test]
    fn test_merged_range_geometry() {
        let range = MergedRange {
            first_row: 2,
            first_col: 1,
            last_row: 9,
            last_col: 4,
        };
        assert!(range.contains(2, 1));
        assert!(range.contains(9, 4));
        assert!(!range.contains(10, 4));
        assert!(!range.contains(2, 0));
        assert_eq!(range.rows(), 8);
        assert_eq!(range.cols(), 4);
    }
}
