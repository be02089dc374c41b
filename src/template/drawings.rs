//! Enumeration of images already embedded in a template.
//!
//! calamine does not expose drawing anchors, so the xlsx is opened as a zip
//! and `xl/drawings/drawing{n}.xml` is scanned for anchor cells and extents.
//! The data is advisory (the planner uses it to avoid covering existing
//! images), so any missing or malformed part degrades to "no images".

use crate::template::ExistingImage;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// EMU per pixel at 96 dpi.
const EMU_PER_PX: u64 = 9525;

lazy_static! {
    static ref ANCHOR_RE: Regex = Regex::new(
        r"(?s)<xdr:(?:twoCellAnchor|oneCellAnchor|absoluteAnchor).*?</xdr:(?:twoCellAnchor|oneCellAnchor|absoluteAnchor)>"
    )
    .unwrap();
    static ref FROM_RE: Regex = Regex::new(
        r"(?s)<xdr:from>.*?<xdr:col>(\d+)</xdr:col>.*?<xdr:row>(\d+)</xdr:row>"
    )
    .unwrap();
    static ref EXT_RE: Regex = Regex::new(r#"<a:ext[^>]*cx="(\d+)"[^>]*cy="(\d+)""#).unwrap();
}

/// Existing images per worksheet, indexed like the workbook's sheet list.
///
/// Drawing parts are matched to sheets by index (`drawing1.xml` to the first
/// sheet and so on), which holds for workbooks written sheet-by-sheet.
pub fn extract(path: &Path, sheet_count: usize) -> Vec<Vec<ExistingImage>> {
    let mut per_sheet = vec![Vec::new(); sheet_count];

    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return per_sheet,
    };
    let mut archive = match zip::ZipArchive::new(file) {
        Ok(a) => a,
        Err(_) => return per_sheet,
    };

    for (sheet_index, images) in per_sheet.iter_mut().enumerate() {
        let part = format!("xl/drawings/drawing{}.xml", sheet_index + 1);
        let mut xml = String::new();
        match archive.by_name(&part) {
            Ok(mut entry) => {
                if entry.read_to_string(&mut xml).is_err() {
                    continue;
                }
            }
            Err(_) => continue,
        }
        *images = parse_drawing_xml(&xml);
    }

    per_sheet
}

fn parse_drawing_xml(xml: &str) -> Vec<ExistingImage> {
    let mut images = Vec::new();

    for anchor in ANCHOR_RE.find_iter(xml) {
        let anchor = anchor.as_str();
        let (col, row) = match FROM_RE.captures(anchor) {
            Some(caps) => {
                let col: u32 = caps[1].parse().unwrap_or(0);
                let row: u32 = caps[2].parse().unwrap_or(0);
                (col, row)
            }
            None => continue,
        };

        let (width_px, height_px) = match EXT_RE.captures(anchor) {
            Some(caps) => {
                let cx: u64 = caps[1].parse().unwrap_or(0);
                let cy: u64 = caps[2].parse().unwrap_or(0);
                ((cx / EMU_PER_PX) as u32, (cy / EMU_PER_PX) as u32)
            }
            None => (0, 0),
        };

        images.push(ExistingImage {
            row,
            col,
            width_px,
            height_px,
        });
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
<xdr:oneCellAnchor>
<xdr:from><xdr:col>2</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>5</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
<xdr:ext cx="0" cy="0"/>
<xdr:pic><xdr:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="1905000" cy="952500"/></a:xfrm></xdr:spPr></xdr:pic>
</xdr:oneCellAnchor>
</xdr:wsDr>"#;

    #[test]
    fn test_parse_drawing_anchor() {
        let images = parse_drawing_xml(SAMPLE);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].col, 2);
        assert_eq!(images[0].row, 5);
        assert_eq!(images[0].width_px, 200);
        assert_eq!(images[0].height_px, 100);
    }

    #[test]
    fn test_parse_drawing_empty() {
        assert!(parse_drawing_xml("<xdr:wsDr/>").is_empty());
        assert!(parse_drawing_xml("not xml at all").is_empty());
    }

    #[test]
    fn test_extract_from_non_zip() {
        let per_sheet = extract(Path::new("/nonexistent/file.xlsx"), 3);
        assert_eq!(per_sheet.len(), 3);
        assert!(per_sheet.iter().all(|v| v.is_empty()));
    }
}
