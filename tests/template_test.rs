//! Template analysis against real workbook files.

use foto_report::template::{self, PhotoCategory, SheetKind};
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use std::path::Path;

/// Survey-style template: a site data sheet and a photo sheet with a merged
/// photo slot, a plain slot, and ordinary data cells.
fn write_template(path: &Path) {
    let mut workbook = Workbook::new();

    let site = workbook.add_worksheet();
    site.set_name("Site Data").unwrap();
    site.write_string(0, 0, "Site ID").unwrap();
    site.write_string(0, 1, "JKT-0042").unwrap();
    site.write_string(1, 0, "Owner").unwrap();
    site.write_string(1, 1, "PT Contoh").unwrap();

    let photos = workbook.add_worksheet();
    photos.set_name("Foto Dokumentasi").unwrap();
    let border = Format::new().set_border(FormatBorder::Thin);
    photos
        .merge_range(2, 1, 15, 4, "Foto Tower Depan", &border)
        .unwrap();
    photos.write_string(20, 1, "Foto Samping").unwrap();
    photos.write_string(0, 0, "Dokumentasi Lapangan").unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn analyze_finds_placeholders_and_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.xlsx");
    write_template(&path);

    let structure = template::analyze(&path, 100).unwrap();
    assert_eq!(structure.worksheets.len(), 2);
    assert_eq!(structure.placeholder_count(), 2);

    let site = &structure.worksheets[0];
    assert_eq!(site.kind, SheetKind::SiteData);
    assert!(site.placeholders.is_empty());
    assert!(site.cells.iter().any(|c| c.text == "JKT-0042"));

    let photos = &structure.worksheets[1];
    assert_eq!(photos.kind, SheetKind::PhotoDocumentation);
    assert_eq!(photos.placeholders.len(), 2);
    assert_eq!(photos.placeholders[0].label, "Foto Tower Depan");
    assert_eq!(photos.placeholders[0].category, PhotoCategory::Tower);
    assert_eq!(photos.placeholders[1].category, PhotoCategory::General);
    // Placeholders come in row-major order.
    assert!(photos.placeholders[0].row < photos.placeholders[1].row);
}

#[test]
fn analyze_captures_merged_ranges() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.xlsx");
    write_template(&path);

    let structure = template::analyze(&path, 100).unwrap();
    let photos = &structure.worksheets[1];

    let merged = photos.merged_at(2, 1).expect("photo slot should be merged");
    assert_eq!(merged.rows(), 14);
    assert_eq!(merged.cols(), 4);
    assert!(photos.merged_at(20, 1).is_none());
}

#[test]
fn analyze_scan_cap_skips_deep_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(5, 0, "Foto Depan").unwrap();
    sheet.write_string(500, 0, "Foto Belakang").unwrap();
    workbook.save(&path).unwrap();

    let structure = template::analyze(&path, 100).unwrap();
    // The deep placeholder is past the scan cap, but its text is still
    // captured for content reproduction.
    assert_eq!(structure.placeholder_count(), 1);
    assert!(structure.worksheets[0]
        .cells
        .iter()
        .any(|c| c.text == "Foto Belakang"));
}

#[test]
fn analyze_rejects_corrupted_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let result = template::analyze(&path, 100);
    assert!(matches!(
        result,
        Err(foto_report::ReportError::TemplateUnreadable(_))
    ));
}

#[test]
fn analyze_placeholder_count_independent_of_sheet_order() {
    let dir = tempfile::tempdir().unwrap();

    let path_a = dir.path().join("a.xlsx");
    let mut workbook = Workbook::new();
    let s1 = workbook.add_worksheet();
    s1.set_name("Foto 1").unwrap();
    s1.write_string(0, 0, "Foto Depan").unwrap();
    let s2 = workbook.add_worksheet();
    s2.set_name("Foto 2").unwrap();
    s2.write_string(0, 0, "Foto Atas").unwrap();
    workbook.save(&path_a).unwrap();

    let path_b = dir.path().join("b.xlsx");
    let mut workbook = Workbook::new();
    let s1 = workbook.add_worksheet();
    s1.set_name("Foto 2").unwrap();
    s1.write_string(0, 0, "Foto Atas").unwrap();
    let s2 = workbook.add_worksheet();
    s2.set_name("Foto 1").unwrap();
    s2.write_string(0, 0, "Foto Depan").unwrap();
    workbook.save(&path_b).unwrap();

    let a = template::analyze(&path_a, 100).unwrap();
    let b = template::analyze(&path_b, 100).unwrap();
    assert_eq!(a.placeholder_count(), b.placeholder_count());
}
