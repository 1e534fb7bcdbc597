pub mod ani;
pub mod compositor;
pub mod cur;
pub mod dib;
pub mod error;
pub mod reader;

#[cfg(test)]
pub(crate) mod fixtures;

pub use ani::{AniParser, Animation, AnimationHeader};
pub use compositor::ResizeFilter;
pub use cur::{CurParser, DecodedFrame, DirectoryEntry, IconDirectory};
pub use error::{DecodeError, Result};
pub use reader::ByteReader;

use image::RgbaImage;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorFormat {
    Cur,
    Ani,
}

impl CursorFormat {
    /// Accepts `cur`/`ani` in any case, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "cur" => Some(CursorFormat::Cur),
            "ani" => Some(CursorFormat::Ani),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub resize_filter: ResizeFilter,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }
}

/// Normalized decode result. Every frame has the first frame's size and
/// `sheet` holds them stacked vertically, frame 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCursor {
    pub frames: Vec<DecodedFrame>,
    pub sheet: RgbaImage,
    pub width: u32,
    pub height: u32,
    pub hotspot: (u32, u32),
    pub frame_count: usize,
    /// Seconds per frame; 0 for static cursors.
    pub frame_duration: f64,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl ParsedCursor {
    pub fn is_animated(&self) -> bool {
        self.frame_count > 1
    }

    pub fn frame(&self, index: usize) -> Option<&DecodedFrame> {
        self.frames.get(index)
    }

    fn from_frames(
        frames: Vec<DecodedFrame>,
        frame_duration: f64,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let composite = compositor::composite(frames, options.resize_filter)?;

        Ok(Self {
            width: composite.frame_width,
            height: composite.frame_height,
            hotspot: composite.hotspot,
            frame_count: composite.frame_count(),
            frames: composite.frames,
            sheet: composite.sheet,
            frame_duration,
            title: None,
            author: None,
        })
    }
}

pub fn decode(data: &[u8], format: CursorFormat, options: &DecodeOptions) -> Result<ParsedCursor> {
    match format {
        CursorFormat::Cur => {
            let frame = CurParser::parse(data)?;
            ParsedCursor::from_frames(vec![frame], 0.0, options)
        }
        CursorFormat::Ani => {
            let animation = AniParser::parse(data)?;
            let duration = animation.frame_duration();
            let mut cursor = ParsedCursor::from_frames(animation.frames, duration, options)?;
            cursor.title = animation.title;
            cursor.author = animation.author;
            Ok(cursor)
        }
    }
}

pub fn decode_with_extension(
    data: &[u8],
    ext: &str,
    options: &DecodeOptions,
) -> Result<ParsedCursor> {
    let format = CursorFormat::from_extension(ext).ok_or_else(|| {
        let ext = ext.trim_start_matches('.');
        DecodeError::UnsupportedFormat(format!("unsupported file type: .{ext}"))
    })?;
    decode(data, format, options)
}

/// Reads `path` and decodes it according to its extension.
pub fn decode_file(path: &Path, options: &DecodeOptions) -> Result<ParsedCursor> {
    let format = CursorFormat::from_path(path).ok_or_else(|| {
        DecodeError::UnsupportedFormat(format!("unsupported file type: {}", path.display()))
    })?;

    let data = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    decode(&data, format, options)
}
