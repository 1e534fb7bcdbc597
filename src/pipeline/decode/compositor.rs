use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cur::DecodedFrame;
use super::error::{DecodeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub const ALL: [ResizeFilter; 5] = [
        Self::Nearest,
        Self::Triangle,
        Self::CatmullRom,
        Self::Gaussian,
        Self::Lanczos3,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Triangle => "triangle",
            Self::CatmullRom => "catmull_rom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        }
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
                format!("unknown filter '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Frames resized to a common size plus their vertical sprite sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub frames: Vec<DecodedFrame>,
    pub sheet: RgbaImage,
    pub frame_width: u32,
    pub frame_height: u32,
    pub hotspot: (u32, u32),
}

impl Composite {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Resizes every frame to the first frame's size, keeping order.
pub fn normalize_frames(frames: Vec<DecodedFrame>, filter: ResizeFilter) -> Vec<DecodedFrame> {
    let Some((width, height)) = frames.first().map(DecodedFrame::dimensions) else {
        return frames;
    };

    frames
        .into_iter()
        .map(|frame| {
            if frame.dimensions() == (width, height) {
                frame
            } else {
                resize_frame(&frame, width, height, filter)
            }
        })
        .collect()
}

fn resize_frame(
    frame: &DecodedFrame,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> DecodedFrame {
    let (old_width, old_height) = frame.dimensions();
    let image = imageops::resize(&frame.image, width, height, filter.into());

    let scale = |value: u32, new: u32, old: u32| {
        (f64::from(value) * f64::from(new) / f64::from(old.max(1))).round() as u32
    };

    DecodedFrame {
        image,
        hotspot: (
            scale(frame.hotspot.0, width, old_width),
            scale(frame.hotspot.1, height, old_height),
        ),
    }
}

/// Stacks equally sized frames top to bottom, frame 0 first.
pub fn stack_frames(frames: &[DecodedFrame]) -> Result<RgbaImage> {
    let (width, height) = frames.first().map(DecodedFrame::dimensions).unwrap_or((0, 0));
    let sheet_height = u32::try_from(frames.len())
        .ok()
        .and_then(|count| height.checked_mul(count))
        .ok_or_else(|| DecodeError::invalid("sprite sheet would be too tall"))?;

    let mut sheet = RgbaImage::new(width, sheet_height);
    for (idx, frame) in frames.iter().enumerate() {
        imageops::replace(&mut sheet, &frame.image, 0, idx as i64 * i64::from(height));
    }

    Ok(sheet)
}

pub fn composite(frames: Vec<DecodedFrame>, filter: ResizeFilter) -> Result<Composite> {
    let frames = normalize_frames(frames, filter);
    let first = frames
        .first()
        .ok_or_else(|| DecodeError::invalid("no frames to composite"))?;
    let (frame_width, frame_height) = first.dimensions();
    let hotspot = first.hotspot;

    let sheet = stack_frames(&frames)?;

    Ok(Composite {
        frames,
        sheet,
        frame_width,
        frame_height,
        hotspot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, value: u8, hotspot: (u32, u32)) -> DecodedFrame {
        DecodedFrame {
            image: RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255])),
            hotspot,
        }
    }

    #[test]
    fn test_single_frame_is_its_own_sheet() {
        let frame = solid(4, 3, 7, (1, 2));
        let result = composite(vec![frame.clone()], ResizeFilter::default()).unwrap();

        assert_eq!(result.frame_count(), 1);
        assert_eq!(result.sheet, frame.image);
        assert_eq!(result.hotspot, (1, 2));
    }

    #[test]
    fn test_frames_stacked_in_order() {
        let frames = vec![
            solid(2, 2, 10, (0, 0)),
            solid(2, 2, 20, (1, 1)),
            solid(2, 2, 30, (0, 1)),
        ];
        let result = composite(frames, ResizeFilter::Nearest).unwrap();

        assert_eq!(result.sheet.dimensions(), (2, 6));
        assert_eq!(result.sheet.get_pixel(1, 0)[0], 10);
        assert_eq!(result.sheet.get_pixel(1, 3)[0], 20);
        assert_eq!(result.sheet.get_pixel(0, 5)[0], 30);
        assert_eq!(result.hotspot, (0, 0));
    }

    #[test]
    fn test_mismatched_frames_resized_to_first() {
        let frames = vec![
            solid(4, 4, 50, (2, 2)),
            solid(8, 8, 90, (4, 6)),
            solid(2, 2, 120, (1, 1)),
        ];
        let result = composite(frames, ResizeFilter::Lanczos3).unwrap();

        assert_eq!(result.frame_count(), 3);
        for frame in &result.frames {
            assert_eq!(frame.dimensions(), (4, 4));
        }
        assert_eq!(result.frames[1].hotspot, (2, 3));
        assert_eq!(result.frames[2].hotspot, (2, 2));
        assert_eq!(result.sheet.dimensions(), (4, 12));
        // solid colours survive resampling
        assert!(result.sheet.get_pixel(2, 5)[0].abs_diff(90) <= 1);
        assert!(result.sheet.get_pixel(2, 10)[0].abs_diff(120) <= 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_frames(Vec::new(), ResizeFilter::Nearest).is_empty());
        assert!(composite(Vec::new(), ResizeFilter::Nearest).is_err());
    }

    #[test]
    fn test_filter_names() {
        assert_eq!("lanczos3".parse::<ResizeFilter>().unwrap(), ResizeFilter::Lanczos3);
        assert_eq!("Catmull-Rom".parse::<ResizeFilter>().unwrap(), ResizeFilter::CatmullRom);
        assert!("bicubic".parse::<ResizeFilter>().is_err());
        assert_eq!(ResizeFilter::Gaussian.to_string(), "gaussian");
        assert_eq!(FilterType::from(ResizeFilter::Triangle), FilterType::Triangle);
    }
}
