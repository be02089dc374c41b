//! Cloud-drive share-link rewriting.
//!
//! Share links ("/file/d/<ID>/view", "open?id=<ID>") serve an HTML preview
//! page, not the file. They are rewritten to the direct-download form before
//! fetching. Plain http(s) URLs pass through unchanged.

use crate::error::{ReportError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FILE_D_RE: Regex = Regex::new(r"/file/d/([A-Za-z0-9_-]{10,})").unwrap();
    static ref ID_PARAM_RE: Regex = Regex::new(r"[?&]id=([A-Za-z0-9_-]{10,})").unwrap();
}

/// True if the URL points at a drive share host.
pub fn is_drive_url(url: &str) -> bool {
    url.contains("drive.google.com") || url.contains("docs.google.com")
}

/// Extract the file ID from a drive share link.
pub fn extract_drive_id(url: &str) -> Option<String> {
    FILE_D_RE
        .captures(url)
        .or_else(|| ID_PARAM_RE.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Rewrite a photo URL to a directly fetchable form.
///
/// Drive links become `uc?export=download&id=<ID>`; a drive link without an
/// extractable ID and any non-http scheme are rejected with `UnsupportedUrl`.
pub fn to_direct_download(url: &str) -> Result<String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ReportError::UnsupportedUrl(url.to_string()));
    }

    if is_drive_url(url) {
        let id = extract_drive_id(url)
            .ok_or_else(|| ReportError::UnsupportedUrl(url.to_string()))?;
        return Ok(format!(
            "https://drive.google.com/uc?export=download&id={}",
            id
        ));
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_id_from_file_d() {
        let url = "https://drive.google.com/file/d/1aBcDeFgHiJkLmNoP/view?usp=sharing";
        assert_eq!(extract_drive_id(url).as_deref(), Some("1aBcDeFgHiJkLmNoP"));
    }

    #[test]
    fn test_extract_id_from_query_param() {
        let url = "https://drive.google.com/open?id=1aBcDeFgHiJkLmNoP";
        assert_eq!(extract_drive_id(url).as_deref(), Some("1aBcDeFgHiJkLmNoP"));

        let url = "https://drive.google.com/uc?export=download&id=1aBcDeFgHiJkLmNoP";
        assert_eq!(extract_drive_id(url).as_deref(), Some("1aBcDeFgHiJkLmNoP"));
    }

    #[test]
    fn test_extract_id_too_short() {
        // Short segments are not drive file IDs.
        assert_eq!(extract_drive_id("https://drive.google.com/file/d/abc/view"), None);
    }

    #[test]
    fn test_rewrite_drive_link() {
        let url = "https://drive.google.com/file/d/1aBcDeFgHiJkLmNoP/view";
        let direct = to_direct_download(url).unwrap();
        assert_eq!(
            direct,
            "https://drive.google.com/uc?export=download&id=1aBcDeFgHiJkLmNoP"
        );
    }

    #[test]
    fn test_plain_url_passthrough() {
        let url = "https://example.com/photos/site-42.jpg";
        assert_eq!(to_direct_download(url).unwrap(), url);
    }

    #[test]
    fn test_unsupported_urls() {
        assert!(matches!(
            to_direct_download("ftp://example.com/a.jpg"),
            Err(ReportError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            to_direct_download("https://drive.google.com/drive/folders/shared"),
            Err(ReportError::UnsupportedUrl(_))
        ));
    }
}
