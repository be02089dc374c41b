//! Keyword tables for placeholder detection and categorization.
//!
//! Field templates label photo slots in a mix of Indonesian and English
//! ("Foto Depan", "Photo Top View"), so both vocabularies are matched.
//! All matching is case-insensitive substring matching; category assignment
//! is first-match-wins over the ordered table below.

use serde::{Deserialize, Serialize};

/// Words that mark a cell as a photo placeholder.
const PLACEHOLDER_KEYWORDS: &[&str] = &[
    "foto", "photo", "image", "picture", "gambar",
    // Directional / part words used on their own in survey templates
    "depan", "samping", "belakang", "atas", "bawah",
    "front", "side", "back", "top", "bottom",
];

/// Inferred photo category, used for slot matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoCategory {
    Tower,
    Equipment,
    Environment,
    Detail,
    General,
}

impl PhotoCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoCategory::Tower => "tower",
            PhotoCategory::Equipment => "equipment",
            PhotoCategory::Environment => "environment",
            PhotoCategory::Detail => "detail",
            PhotoCategory::General => "general",
        }
    }
}

/// Ordered keyword families. The first family containing a match wins.
const CATEGORY_KEYWORDS: &[(PhotoCategory, &[&str])] = &[
    (
        PhotoCategory::Tower,
        &["tower", "menara", "struktur", "structure", "pondasi", "foundation", "kaki"],
    ),
    (
        PhotoCategory::Equipment,
        &["equipment", "perangkat", "antena", "antenna", "rectifier", "baterai", "battery", "shelter", "panel"],
    ),
    (
        PhotoCategory::Environment,
        &["lingkungan", "environment", "akses", "access", "jalan", "pagar", "fence", "sekitar"],
    ),
    (PhotoCategory::Detail, &["detail", "close"]),
];

/// Worksheet type inferred from the sheet name. Diagnostic only; it never
/// gates placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    Cover,
    SiteData,
    TowerSurvey,
    Equipment,
    PhotoDocumentation,
    General,
}

impl SheetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Cover => "cover",
            SheetKind::SiteData => "site data",
            SheetKind::TowerSurvey => "tower survey",
            SheetKind::Equipment => "equipment",
            SheetKind::PhotoDocumentation => "photo documentation",
            SheetKind::General => "general",
        }
    }
}

/// True if the cell text marks a photo placeholder.
pub fn is_placeholder_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    PLACEHOLDER_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Assign a category to a placeholder label (or photo file name).
pub fn categorize(text: &str) -> PhotoCategory {
    let lower = text.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *category;
        }
    }
    PhotoCategory::General
}

/// Infer the worksheet type from its name.
pub fn sheet_kind(name: &str) -> SheetKind {
    let lower = name.to_lowercase();
    if lower.contains("cover") || lower.contains("sampul") {
        SheetKind::Cover
    } else if lower.contains("site data") || lower.contains("data site") || lower.contains("site info") {
        SheetKind::SiteData
    } else if lower.contains("foto") || lower.contains("photo") || lower.contains("dokumentasi") {
        SheetKind::PhotoDocumentation
    } else if lower.contains("equipment") || lower.contains("perangkat") {
        SheetKind::Equipment
    } else if lower.contains("tower") || lower.contains("menara") || lower.contains("survey") {
        SheetKind::TowerSurvey
    } else {
        SheetKind::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder_text("Foto Depan"));
        assert!(is_placeholder_text("FOTO SAMPING"));
        assert!(is_placeholder_text("Photo of the tower"));
        assert!(is_placeholder_text("Gambar 1"));
        assert!(is_placeholder_text("Top View"));
        assert!(!is_placeholder_text("Site ID"));
        assert!(!is_placeholder_text("Nama Pemilik"));
        assert!(!is_placeholder_text(""));
    }

    #[test]
    fn test_categorize_first_match_wins() {
        assert_eq!(categorize("Foto Tower Depan"), PhotoCategory::Tower);
        assert_eq!(categorize("Foto Menara"), PhotoCategory::Tower);
        assert_eq!(categorize("Photo Antenna Panel"), PhotoCategory::Equipment);
        assert_eq!(categorize("Foto Akses Jalan"), PhotoCategory::Environment);
        assert_eq!(categorize("Detail Baut"), PhotoCategory::Detail);
        assert_eq!(categorize("Foto Depan"), PhotoCategory::General);
        // Tower family is listed before equipment, so a mixed label goes to tower.
        assert_eq!(categorize("Tower Equipment"), PhotoCategory::Tower);
    }

    #[test]
    fn test_sheet_kind() {
        assert_eq!(sheet_kind("Cover"), SheetKind::Cover);
        assert_eq!(sheet_kind("Site Data"), SheetKind::SiteData);
        assert_eq!(sheet_kind("Tower Survey"), SheetKind::TowerSurvey);
        assert_eq!(sheet_kind("Perangkat"), SheetKind::Equipment);
        assert_eq!(sheet_kind("Foto Dokumentasi"), SheetKind::PhotoDocumentation);
        assert_eq!(sheet_kind("Sheet1"), SheetKind::General);
        // Photo keywords take priority over tower keywords in mixed names.
        assert_eq!(sheet_kind("Tower Photos"), SheetKind::PhotoDocumentation);
    }
}
