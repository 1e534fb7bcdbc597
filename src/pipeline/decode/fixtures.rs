// Builders for synthetic cursor files used across the test suites

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// 40 byte BITMAPINFOHEADER with the given *stored* height.
pub fn dib_header(width: i32, stored_height: i32, bit_count: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(40);
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&stored_height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&bit_count.to_le_bytes());
    out.extend_from_slice(&[0u8; 24]);
    out
}

fn mask_stride(width: u32) -> usize {
    (width as usize).div_ceil(32) * 4
}

/// 32-bit DIB. `bgra` is in file order (bottom row first). The AND mask is all clear.
pub fn dib32(width: u32, height: u32, bgra: &[[u8; 4]]) -> Vec<u8> {
    assert_eq!(bgra.len(), (width * height) as usize);
    let mut out = dib_header(width as i32, height as i32 * 2, 32);
    for px in bgra {
        out.extend_from_slice(px);
    }
    out.resize(out.len() + mask_stride(width) * height as usize, 0);
    out
}

/// 24-bit DIB. `bgr` is in file order; `mask_rows` holds the leading mask
/// byte of each stored row.
pub fn dib24(width: u32, height: u32, bgr: &[[u8; 3]], mask_rows: &[u8]) -> Vec<u8> {
    assert_eq!(bgr.len(), (width * height) as usize);
    assert_eq!(mask_rows.len(), height as usize);

    let row_size = ((width as usize * 3) + 3) / 4 * 4;
    let mut out = dib_header(width as i32, height as i32 * 2, 24);
    for row in bgr.chunks(width as usize) {
        let start = out.len();
        for px in row {
            out.extend_from_slice(px);
        }
        out.resize(start + row_size, 0);
    }
    for &first in mask_rows {
        let start = out.len();
        out.push(first);
        out.resize(start + mask_stride(width), 0);
    }
    out
}

pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// One image of a synthetic directory.
#[derive(Clone)]
pub struct DirImage {
    pub width: u8,
    pub height: u8,
    pub hotspot: (u16, u16),
    pub blob: Vec<u8>,
}

impl DirImage {
    /// A solid 32-bit DIB whose colour encodes its width.
    pub fn solid(width: u8, height: u8, hotspot: (u16, u16)) -> Self {
        let (w, h) = (u32::from(width), u32::from(height));
        let blob = dib32(w, h, &vec![[width, 0, 0, 255]; (w * h) as usize]);
        Self {
            width,
            height,
            hotspot,
            blob,
        }
    }

    pub fn with_blob(width: u8, height: u8, hotspot: (u16, u16), blob: Vec<u8>) -> Self {
        Self {
            width,
            height,
            hotspot,
            blob,
        }
    }
}

/// A `.cur` file (type 2) holding `images` in order.
pub fn cur_file(images: &[DirImage]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&(images.len() as u16).to_le_bytes());

    let mut offset = 6 + 16 * images.len();
    for img in images {
        out.push(img.width);
        out.push(img.height);
        out.push(0);
        out.push(0);
        out.extend_from_slice(&img.hotspot.0.to_le_bytes());
        out.extend_from_slice(&img.hotspot.1.to_le_bytes());
        out.extend_from_slice(&(img.blob.len() as u32).to_le_bytes());
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += img.blob.len();
    }
    for img in images {
        out.extend_from_slice(&img.blob);
    }
    out
}

/// A RIFF chunk, padded to an even length.
pub fn chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 9);
    out.extend_from_slice(id);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

pub fn list(list_type: &[u8; 4], sub_chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut data = list_type.to_vec();
    for sub in sub_chunks {
        data.extend_from_slice(sub);
    }
    chunk(b"LIST", &data)
}

pub fn anih(frame_count: u32, step_count: u32, display_rate: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    for field in [36, frame_count, step_count, 0, 0, 0, 0, display_rate, 1] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    chunk(b"anih", &data)
}

pub fn rate(ticks: &[u32]) -> Vec<u8> {
    let data: Vec<u8> = ticks.iter().flat_map(|t| t.to_le_bytes()).collect();
    chunk(b"rate", &data)
}

pub fn icon(image: DirImage) -> Vec<u8> {
    chunk(b"icon", &cur_file(&[image]))
}

pub fn riff_acon(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut out = Vec::with_capacity(body.len() + 12);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
    out.extend_from_slice(b"ACON");
    out.extend_from_slice(&body);
    out
}

/// A complete `.ani` with one `icon` per entry of `frames`.
pub fn ani_file(display_rate: u32, frames: Vec<DirImage>) -> Vec<u8> {
    let count = frames.len() as u32;
    let icons: Vec<Vec<u8>> = frames.into_iter().map(icon).collect();
    riff_acon(&[anih(count, count, display_rate), list(b"fram", &icons)])
}
