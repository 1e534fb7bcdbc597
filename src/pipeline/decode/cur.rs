use image::RgbaImage;

use super::dib::decode_blob;
use super::error::{DecodeError, Result};
use super::reader::ByteReader;

const ICO_TYPE_ICON: u16 = 1;
const ICO_TYPE_CUR: u16 = 2;

/// One fully decoded raster with its hotspot.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub image: RgbaImage,
    pub hotspot: (u32, u32),
}

impl DecodedFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    Icon,
    Cursor,
}

impl DirectoryKind {
    fn from_type(value: u16) -> Option<Self> {
        match value {
            ICO_TYPE_ICON => Some(Self::Icon),
            ICO_TYPE_CUR => Some(Self::Cursor),
            _ => None,
        }
    }
}

/// A 16 byte ICONDIRENTRY. Width and height are already normalized (0 => 256).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub width: u32,
    pub height: u32,
    pub color_count: u8,
    pub hotspot: (u16, u16),
    pub size_bytes: u32,
    pub offset: u32,
}

impl DirectoryEntry {
    pub const SIZE: usize = 16;

    fn read(reader: &mut ByteReader<'_>, kind: DirectoryKind) -> Result<Self> {
        let width = full_size(reader.read_u8()?);
        let height = full_size(reader.read_u8()?);
        let color_count = reader.read_u8()?;
        let _reserved = reader.read_u8()?;
        // icons keep planes/bit count here instead of a hotspot
        let field_a = reader.read_u16()?;
        let field_b = reader.read_u16()?;
        let size_bytes = reader.read_u32()?;
        let offset = reader.read_u32()?;

        let hotspot = match kind {
            DirectoryKind::Cursor => (field_a, field_b),
            DirectoryKind::Icon => (0, 0),
        };

        Ok(Self {
            width,
            height,
            color_count,
            hotspot,
            size_bytes,
            offset,
        })
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

fn full_size(value: u8) -> u32 {
    if value == 0 { 256 } else { u32::from(value) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconDirectory {
    pub kind: DirectoryKind,
    pub entries: Vec<DirectoryEntry>,
}

impl IconDirectory {
    /// Parses a `.cur` directory (type 2 only).
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_accepting(data, &[DirectoryKind::Cursor])
    }

    fn parse_accepting(data: &[u8], accepted: &[DirectoryKind]) -> Result<Self> {
        let mut reader = ByteReader::new(data);

        let reserved = reader.read_u16()?;
        let ico_type = reader.read_u16()?;
        let image_count = reader.read_u16()?;

        if reserved != 0 {
            return Err(DecodeError::invalid(format!(
                "reserved field in cursor header is {reserved}, expected 0"
            )));
        }

        let kind = DirectoryKind::from_type(ico_type)
            .filter(|kind| accepted.contains(kind))
            .ok_or_else(|| {
                DecodeError::invalid(format!("not a cursor file (type={ico_type}, expected 2)"))
            })?;

        if image_count == 0 {
            return Err(DecodeError::invalid("no cursor images in file"));
        }

        let mut entries = Vec::with_capacity(usize::from(image_count));
        for _ in 0..image_count {
            entries.push(DirectoryEntry::read(&mut reader, kind)?);
        }

        Ok(Self { kind, entries })
    }

    /// Largest width x height wins; ties go to the earliest entry.
    pub fn best_entry(&self) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .reduce(|best, entry| if entry.area() > best.area() { entry } else { best })
    }

    pub fn image_blob<'a>(data: &'a [u8], entry: &DirectoryEntry) -> Result<&'a [u8]> {
        let mut reader = ByteReader::new(data);
        reader.seek(entry.offset as usize)?;
        reader.read_bytes(entry.size_bytes as usize)
    }
}

pub struct CurParser;

impl CurParser {
    /// Decodes the highest resolution image of a standalone `.cur` file.
    pub fn parse(data: &[u8]) -> Result<DecodedFrame> {
        let directory = IconDirectory::parse(data)?;
        Self::decode_best(data, &directory)
    }

    /// Decodes an `icon` chunk embedded in an animated cursor. Those may be
    /// plain icons, in which case the hotspot is the origin.
    pub fn parse_embedded(data: &[u8]) -> Result<DecodedFrame> {
        let directory = IconDirectory::parse_accepting(
            data,
            &[DirectoryKind::Cursor, DirectoryKind::Icon],
        )?;
        Self::decode_best(data, &directory)
    }

    fn decode_best(data: &[u8], directory: &IconDirectory) -> Result<DecodedFrame> {
        let entry = directory
            .best_entry()
            .ok_or_else(|| DecodeError::invalid("no cursor images in file"))?;

        let blob = IconDirectory::image_blob(data, entry)?;
        let image = decode_blob(blob, (entry.width, entry.height))?;

        Ok(DecodedFrame {
            image,
            hotspot: (u32::from(entry.hotspot.0), u32::from(entry.hotspot.1)),
        })
    }
}
