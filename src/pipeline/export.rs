// JSON reports and PNG sprite-sheet output

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::batch::BatchEntry;
use super::decode::{DecodeError, ParsedCursor};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorSummary {
    pub width: u32,
    pub height: u32,
    pub hotspot_x: u32,
    pub hotspot_y: u32,
    pub frame_count: usize,
    pub frame_duration: f64,
    /// Base64 PNG of the sprite sheet.
    pub image_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl CursorSummary {
    pub fn from_cursor(cursor: &ParsedCursor) -> Result<Self> {
        let png = encode_png(&cursor.sheet)?;

        Ok(Self {
            width: cursor.width,
            height: cursor.height,
            hotspot_x: cursor.hotspot.0,
            hotspot_y: cursor.hotspot.1,
            frame_count: cursor.frame_count,
            frame_duration: cursor.frame_duration,
            image_data: STANDARD.encode(png),
            title: cursor.title.clone(),
            author: cursor.author.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub summary: Option<CursorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl CursorReport {
    pub fn success(summary: CursorSummary) -> Self {
        Self {
            success: true,
            filename: None,
            summary: Some(summary),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(error: &DecodeError) -> Self {
        Self {
            success: false,
            filename: None,
            summary: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
        }
    }

    /// Builds a report from a decode result. A sheet that cannot be
    /// re-encoded is reported as a decoding failure.
    pub fn from_result(result: &Result<ParsedCursor, DecodeError>) -> Self {
        match result {
            Ok(cursor) => match CursorSummary::from_cursor(cursor) {
                Ok(summary) => Self::success(summary),
                Err(e) => Self {
                    success: false,
                    filename: None,
                    summary: None,
                    error: Some(format!("{e:#}")),
                    error_kind: Some("decoding_failed".to_string()),
                },
            },
            Err(e) => Self::failure(e),
        }
    }

    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderReport {
    pub success: bool,
    pub cursors: Vec<CursorReport>,
}

impl FolderReport {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let cursors = entries
            .iter()
            .map(|entry| CursorReport::from_result(&entry.result).with_filename(&entry.name))
            .collect();

        Self {
            success: true,
            cursors,
        }
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(buf)
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Writes `<name>.png` for every successful entry and returns the paths written.
pub fn export_sheets(entries: &[BatchEntry], out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();
    for entry in entries {
        let Ok(cursor) = &entry.result else {
            continue;
        };
        let path = out_dir.join(format!("{}.png", entry.name));
        write_png(&cursor.sheet, &path)?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize report")
}
