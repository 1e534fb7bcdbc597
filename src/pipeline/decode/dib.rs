// Pixel blob decoding: embedded PNG or legacy DIB (XOR colour plane + AND mask)

use image::{ImageFormat, Rgba, RgbaImage};

use super::error::{DecodeError, Result};
use super::reader::ByteReader;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const BMP_FILE_HEADER_SIZE: usize = 14;
const BI_BITFIELDS: u32 = 3;

/// Opaque magenta at half alpha, used when a bitmap can't be decoded at all.
pub const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([255, 0, 255, 128]);

/// The part of a BITMAPINFOHEADER the decoder needs. `height` is the logical
/// image height, i.e. half of the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DibHeader {
    pub header_size: u32,
    pub width: u32,
    pub height: u32,
    pub top_down: bool,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
}

impl DibHeader {
    /// Bytes up to and including the compression field.
    pub const MIN_SIZE: usize = 20;

    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let header_size = reader.read_u32()?;
        let width = reader.read_i32()?;
        let stored_height = reader.read_i32()?;
        let planes = reader.read_u16()?;
        let bit_count = reader.read_u16()?;
        let compression = reader.read_u32()?;

        if (header_size as usize) < DibHeader::MIN_SIZE {
            return Err(DecodeError::invalid(format!(
                "bitmap header size {header_size} is too small"
            )));
        }

        let width = width.unsigned_abs();
        let height = stored_height.unsigned_abs() / 2;
        if width == 0 || height == 0 {
            return Err(DecodeError::invalid(format!(
                "bitmap has empty dimensions {width}x{height}"
            )));
        }

        Ok(Self {
            header_size,
            width,
            height,
            top_down: stored_height < 0,
            planes,
            bit_count,
            compression,
        })
    }

    fn pixel_offset(&self) -> usize {
        // v3 headers with BI_BITFIELDS carry three colour masks after the header
        if self.compression == BI_BITFIELDS && self.header_size == 40 {
            self.header_size as usize + 12
        } else {
            self.header_size as usize
        }
    }

    fn row_index(&self, stored_row: u32) -> u32 {
        if self.top_down {
            stored_row
        } else {
            self.height - 1 - stored_row
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PixelBlob<'a> {
    Png(&'a [u8]),
    Dib { header: DibHeader, data: &'a [u8] },
}

impl<'a> PixelBlob<'a> {
    pub fn sniff(data: &'a [u8]) -> Result<Self> {
        if data.starts_with(PNG_SIGNATURE) {
            return Ok(Self::Png(data));
        }

        let header = DibHeader::read(&mut ByteReader::new(data))?;
        Ok(Self::Dib { header, data })
    }
}

/// Turns an image blob from a directory entry into straight RGBA.
/// `nominal` is the entry's size, only used for the placeholder.
pub fn decode_blob(data: &[u8], nominal: (u32, u32)) -> Result<RgbaImage> {
    match PixelBlob::sniff(data)? {
        PixelBlob::Png(png) => decode_png(png),
        PixelBlob::Dib { header, data } => match header.bit_count {
            32 => decode_bgra32(&header, data),
            24 => decode_bgr24(&header, data),
            _ => Ok(decode_via_codec(&header, data).unwrap_or_else(|_| placeholder(nominal))),
        },
    }
}

fn decode_png(data: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)?;
    Ok(img.to_rgba8())
}

fn block_len(row_size: usize, rows: u32) -> Result<usize> {
    row_size
        .checked_mul(rows as usize)
        .ok_or_else(|| DecodeError::invalid("bitmap dimensions overflow"))
}

fn decode_bgra32(header: &DibHeader, data: &[u8]) -> Result<RgbaImage> {
    let row_size = (header.width as usize)
        .checked_mul(4)
        .ok_or_else(|| DecodeError::invalid("bitmap dimensions overflow"))?;

    let mut reader = ByteReader::new(data);
    reader.seek(header.pixel_offset())?;
    let pixels = reader.read_bytes(block_len(row_size, header.height)?)?;

    let mut image = RgbaImage::new(header.width, header.height);
    for (stored_row, row) in pixels.chunks_exact(row_size).enumerate() {
        let y = header.row_index(stored_row as u32);
        for (x, px) in row.chunks_exact(4).enumerate() {
            image.put_pixel(x as u32, y, Rgba([px[2], px[1], px[0], px[3]]));
        }
    }

    Ok(image)
}

fn decode_bgr24(header: &DibHeader, data: &[u8]) -> Result<RgbaImage> {
    let row_size = padded_row_size(header.width, 24)?;

    let mut reader = ByteReader::new(data);
    reader.seek(header.pixel_offset())?;
    let pixels = reader.read_bytes(block_len(row_size, header.height)?)?;

    let mut image = RgbaImage::new(header.width, header.height);
    for (stored_row, row) in pixels.chunks_exact(row_size).enumerate() {
        let y = header.row_index(stored_row as u32);
        for x in 0..header.width {
            let i = x as usize * 3;
            image.put_pixel(x, y, Rgba([row[i + 2], row[i + 1], row[i], 255]));
        }
    }

    apply_and_mask(&mut image, header, data, reader.position());
    Ok(image)
}

/// Rows are padded to a 4 byte boundary.
fn padded_row_size(width: u32, bit_count: u16) -> Result<usize> {
    let bits = u64::from(width) * u64::from(bit_count);
    usize::try_from(bits.div_ceil(32) * 4)
        .map_err(|_| DecodeError::invalid("bitmap dimensions overflow"))
}

/// Clears alpha wherever the 1-bit AND mask starting at `offset` is set.
/// Missing mask bytes count as opaque; padding bits past `width` are ignored.
fn apply_and_mask(image: &mut RgbaImage, header: &DibHeader, data: &[u8], offset: usize) {
    let stride = (image.width() as usize).div_ceil(32) * 4;

    for stored_row in 0..image.height() {
        let y = header.row_index(stored_row);
        let row_start = offset + stored_row as usize * stride;

        for x in 0..image.width() {
            let Some(&byte) = data.get(row_start + x as usize / 8) else {
                break;
            };
            if (byte >> (7 - x % 8)) & 1 == 1 {
                image.get_pixel_mut(x, y)[3] = 0;
            }
        }
    }
}

/// Wraps the DIB in a BMP file header and lets the generic codec handle it.
/// The stored height is halved first so the codec only sees the colour plane.
fn decode_via_codec(header: &DibHeader, data: &[u8]) -> Result<RgbaImage> {
    let palette = palette_size(header, data);
    let pixel_offset = header.header_size as usize + palette;

    let mut bmp = Vec::with_capacity(BMP_FILE_HEADER_SIZE + data.len());
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&((BMP_FILE_HEADER_SIZE + data.len()) as u32).to_le_bytes());
    bmp.extend_from_slice(&[0, 0, 0, 0]);
    bmp.extend_from_slice(&((BMP_FILE_HEADER_SIZE + pixel_offset) as u32).to_le_bytes());

    let dib_start = bmp.len();
    bmp.extend_from_slice(data);
    let height = header.height as i32 * if header.top_down { -1 } else { 1 };
    bmp[dib_start + 8..dib_start + 12].copy_from_slice(&height.to_le_bytes());

    let mut image = image::load_from_memory_with_format(&bmp, ImageFormat::Bmp)?.to_rgba8();

    if header.bit_count < 32 && image.dimensions() == (header.width, header.height) {
        let xor_size = block_len(padded_row_size(header.width, header.bit_count)?, header.height)?;
        apply_and_mask(&mut image, header, data, pixel_offset + xor_size);
    }

    Ok(image)
}

fn palette_size(header: &DibHeader, data: &[u8]) -> usize {
    let colors_used = if header.header_size >= 36 {
        data.get(32..36)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .unwrap_or(0)
    } else {
        0
    };

    let entries = if colors_used > 0 {
        colors_used as usize
    } else if header.bit_count <= 8 {
        1 << header.bit_count
    } else {
        0
    };

    entries * 4
}

fn placeholder(nominal: (u32, u32)) -> RgbaImage {
    RgbaImage::from_pixel(nominal.0.max(1), nominal.1.max(1), PLACEHOLDER_COLOR)
}
