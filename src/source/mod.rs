//! Photo resolution.
//!
//! Turns a `PhotoReference` (local path, uploaded temp file, or remote URL)
//! into raw bytes. Remote fetches are bounded by the job deadline; every
//! failure maps to a recoverable error so the batch continues past one bad
//! photo. Vector payloads are rasterized before they reach the composer,
//! since the workbook format only embeds raster images.

mod share_link;

pub use self::share_link::{extract_drive_id, is_drive_url, to_direct_download};

use crate::error::{ReportError, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg"];

/// Where the photo bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoLocation {
    /// A caller-owned file on disk.
    Local(PathBuf),
    /// An uploaded temp file, deleted by the runner when the job terminates.
    Uploaded(PathBuf),
    /// A remote URL, possibly a drive share link.
    Remote(String),
}

/// Caller-provided photo descriptor. Immutable input.
#[derive(Debug, Clone)]
pub struct PhotoReference {
    pub location: PhotoLocation,
    pub file_name: String,
    pub mime: Option<String>,
    pub declared_size: Option<u64>,
}

impl PhotoReference {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = file_name_of(&path);
        Self {
            location: PhotoLocation::Local(path),
            file_name,
            mime: None,
            declared_size: None,
        }
    }

    pub fn uploaded(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            location: PhotoLocation::Uploaded(path.into()),
            file_name: original_name.into(),
            mime: None,
            declared_size: None,
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        let url = url.into();
        let file_name = url
            .rsplit('/')
            .next()
            .unwrap_or("photo")
            .split('?')
            .next()
            .unwrap_or("photo")
            .to_string();
        Self {
            location: PhotoLocation::Remote(url),
            file_name,
            mime: None,
            declared_size: None,
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "photo".to_string())
}

/// Raw bytes ready for placement. Transient; dropped after embedding.
#[derive(Debug, Clone)]
pub struct ResolvedPhoto {
    pub file_name: String,
    pub data: Vec<u8>,
    pub mime: String,
}

/// Resolves photo references into bytes.
pub struct PhotoSource {
    client: reqwest::Client,
}

impl Default for PhotoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Resolve one reference, bounded by the remaining time to `deadline`.
    pub async fn resolve(&self, reference: &PhotoReference, deadline: Instant) -> Result<ResolvedPhoto> {
        let data = match &reference.location {
            PhotoLocation::Local(path) | PhotoLocation::Uploaded(path) => {
                if !path.exists() {
                    return Err(ReportError::FileNotFound(path.display().to_string()));
                }
                tokio::fs::read(path).await?
            }
            PhotoLocation::Remote(url) => self.fetch_remote(url, deadline).await?,
        };

        let mut mime = reference
            .mime
            .clone()
            .unwrap_or_else(|| mime_for_name(&reference.file_name));

        let data = if looks_like_svg(&mime, &reference.file_name, &data) {
            mime = "image/png".to_string();
            rasterize_svg(&data)?
        } else {
            data
        };

        Ok(ResolvedPhoto {
            file_name: reference.file_name.clone(),
            data,
            mime,
        })
    }

    async fn fetch_remote(&self, url: &str, deadline: Instant) -> Result<Vec<u8>> {
        let direct = to_direct_download(url)?;

        let remaining = deadline
            .checked_duration_since(Instant::now())
            .ok_or_else(|| ReportError::DownloadTimeout(url.to_string()))?;

        let response = self
            .client
            .get(&direct)
            .timeout(remaining)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReportError::DownloadTimeout(url.to_string())
                } else {
                    ReportError::DownloadFailed(format!("{}: {}", url, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::DownloadFailed(format!("{}: HTTP {}", url, status)));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ReportError::DownloadTimeout(url.to_string())
            } else {
                ReportError::DownloadFailed(format!("{}: {}", url, e))
            }
        })?;

        Ok(bytes.to_vec())
    }
}

/// Scan a folder for photo files, sorted by file name for stable batch order.
pub fn scan_photo_dir(folder: &Path) -> Result<Vec<PhotoReference>> {
    if !folder.exists() {
        return Err(ReportError::FileNotFound(folder.display().to_string()));
    }

    let mut refs = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if IMAGE_EXTENSIONS.iter().any(|&e| e == ext) {
                refs.push(PhotoReference::local(path));
            }
        }
    }

    refs.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(refs)
}

/// MIME type guessed from a file name extension.
pub fn mime_for_name(name: &str) -> String {
    let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
    .to_string()
}

fn looks_like_svg(mime: &str, name: &str, data: &[u8]) -> bool {
    if mime.contains("svg") || name.to_lowercase().ends_with(".svg") {
        return true;
    }
    let head = String::from_utf8_lossy(&data[..data.len().min(512)]);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Rasterize an SVG payload to PNG.
fn rasterize_svg(data: &[u8]) -> Result<Vec<u8>> {
    let options = resvg::usvg::Options::default();
    let tree = resvg::usvg::Tree::from_data(data, &options)
        .map_err(|e| ReportError::ImageDecode(format!("svg parse: {}", e)))?;

    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ReportError::ImageDecode("svg has zero size".into()))?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| ReportError::ImageDecode(format!("svg raster encode: {}", e)))
}

/// Parse a human-entered size string ("12345", "200 KB", "3.5MB") into bytes.
pub fn parse_byte_size(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(plain) = trimmed.parse::<u64>() {
        return Some(plain);
    }

    let split = trimmed.find(|c: char| c.is_ascii_alphabetic())?;
    let (number, unit) = trimmed.split_at(split);
    let value: f64 = number.trim().parse().ok()?;
    if value < 0.0 {
        return None;
    }

    let factor: u64 = match unit.trim().to_lowercase().as_str() {
        "b" => 1,
        "kb" | "k" => 1024,
        "mb" | "m" => 1024 * 1024,
        "gb" | "g" => 1024 * 1024 * 1024,
        _ => return None,
    };

    Some((value * factor as f64).round() as u64)
}
