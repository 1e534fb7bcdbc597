use super::cur::{CurParser, DecodedFrame};
use super::error::{DecodeError, Result};
use super::reader::ByteReader;

const SIGNATURE: &[u8; 4] = b"RIFF";
const ANI_TYPE: &[u8; 4] = b"ACON";
const HEADER_CHUNK: &[u8; 4] = b"anih";
const RATE_CHUNK: &[u8; 4] = b"rate";
const LIST_CHUNK: &[u8; 4] = b"LIST";
const FRAME_TYPE: &[u8; 4] = b"fram";
const INFO_TYPE: &[u8; 4] = b"INFO";
const ICON_CHUNK: &[u8; 4] = b"icon";
const TITLE_CHUNK: &[u8; 4] = b"INAM";
const AUTHOR_CHUNK: &[u8; 4] = b"IART";

const ICON_FLAG: u32 = 0x1;
const DEFAULT_DISPLAY_RATE: u32 = 10;

/// Display rates are stored in jiffies.
pub const TICKS_PER_SECOND: f64 = 60.0;

/// ANIHEADER, nine little-endian DWORDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHeader {
    pub size: u32,
    pub frame_count: u32,
    pub step_count: u32,
    pub width: u32,
    pub height: u32,
    pub bit_count: u32,
    pub planes: u32,
    pub display_rate: u32,
    pub flags: u32,
}

impl Default for AnimationHeader {
    fn default() -> Self {
        Self {
            size: Self::SIZE as u32,
            frame_count: 1,
            step_count: 1,
            width: 0,
            height: 0,
            bit_count: 0,
            planes: 0,
            display_rate: DEFAULT_DISPLAY_RATE,
            flags: ICON_FLAG,
        }
    }
}

impl AnimationHeader {
    pub const SIZE: usize = 36;

    /// A chunk too short to hold a full header yields the defaults.
    fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Ok(Self::default());
        }

        let mut reader = ByteReader::new(data);
        Ok(Self {
            size: reader.read_u32()?,
            frame_count: reader.read_u32()?,
            step_count: reader.read_u32()?,
            width: reader.read_u32()?,
            height: reader.read_u32()?,
            bit_count: reader.read_u32()?,
            planes: reader.read_u32()?,
            display_rate: reader.read_u32()?,
            flags: reader.read_u32()?,
        })
    }
}

/// A RIFF chunk borrowed out of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffChunk<'a> {
    pub id: [u8; 4],
    pub data: &'a [u8],
}

impl<'a> RiffChunk<'a> {
    pub const HEADER_SIZE: usize = 8;

    /// Reads id, size and payload, then steps over the pad byte of an
    /// odd-sized chunk. A pad byte missing at the very end is tolerated.
    pub fn read(reader: &mut ByteReader<'a>) -> Result<Self> {
        let id = reader.read_fourcc()?;
        let size = reader.read_u32()? as usize;
        let data = reader.read_bytes(size)?;

        if size % 2 == 1 && reader.remaining() > 0 {
            reader.skip(1)?;
        }

        Ok(Self { id, data })
    }
}

/// Everything pulled out of an `.ani` file before frames are composited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub header: Option<AnimationHeader>,
    pub rates: Vec<u32>,
    pub frames: Vec<DecodedFrame>,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl Animation {
    /// Seconds each frame stays on screen. Explicit rates are averaged,
    /// otherwise the header's default rate applies.
    pub fn frame_duration(&self) -> f64 {
        if !self.rates.is_empty() {
            let total: u64 = self.rates.iter().map(|&r| u64::from(r)).sum();
            let mean = total as f64 / self.rates.len() as f64;
            return mean / TICKS_PER_SECOND;
        }

        let header = self.header.unwrap_or_default();
        f64::from(header.display_rate) / TICKS_PER_SECOND
    }
}

pub struct AniParser;

impl AniParser {
    pub fn parse(data: &[u8]) -> Result<Animation> {
        let mut reader = ByteReader::new(data);

        if &reader.read_fourcc()? != SIGNATURE {
            return Err(DecodeError::invalid("not a valid RIFF file"));
        }
        // declared size is unreliable in the wild; the buffer length rules
        let _riff_size = reader.read_u32()?;
        if &reader.read_fourcc()? != ANI_TYPE {
            return Err(DecodeError::invalid("not an animated cursor file"));
        }

        let mut ani = Animation::default();

        while reader.remaining() >= RiffChunk::HEADER_SIZE {
            let chunk = RiffChunk::read(&mut reader)?;

            match &chunk.id {
                HEADER_CHUNK => ani.header = Some(AnimationHeader::parse(chunk.data)?),
                RATE_CHUNK => ani.rates = Self::read_rate_chunk(chunk.data)?,
                LIST_CHUNK => Self::read_list(chunk.data, &mut ani)?,
                _ => {}
            }
        }

        if ani.frames.is_empty() {
            return Err(DecodeError::invalid("no frames found in ANI file"));
        }

        // the rate table may precede the header, so clamp once both are known
        let declared = ani
            .header
            .map(|h| h.frame_count as usize)
            .unwrap_or(ani.frames.len());
        ani.rates.truncate(declared);

        Ok(ani)
    }

    fn read_rate_chunk(data: &[u8]) -> Result<Vec<u32>> {
        let mut reader = ByteReader::new(data);
        let mut rates = Vec::with_capacity(data.len() / 4);
        while reader.remaining() >= 4 {
            rates.push(reader.read_u32()?);
        }
        Ok(rates)
    }

    fn read_list(data: &[u8], ani: &mut Animation) -> Result<()> {
        let mut reader = ByteReader::new(data);
        let list_type = reader.read_fourcc()?;

        match &list_type {
            // a later frame list replaces an earlier one
            FRAME_TYPE => ani.frames = Self::read_frames(&mut reader),
            INFO_TYPE => Self::read_info(&mut reader, ani),
            _ => {}
        }

        Ok(())
    }

    /// Each `icon` sub-chunk is a complete cursor directory. Frames that
    /// fail to decode are dropped; a damaged sub-chunk header ends the list.
    fn read_frames(reader: &mut ByteReader<'_>) -> Vec<DecodedFrame> {
        let mut frames = Vec::new();
        while reader.remaining() >= RiffChunk::HEADER_SIZE {
            let Ok(chunk) = RiffChunk::read(reader) else {
                break;
            };

            if &chunk.id == ICON_CHUNK {
                frames.extend(CurParser::parse_embedded(chunk.data).ok());
            }
        }
        frames
    }

    fn read_info(reader: &mut ByteReader<'_>, ani: &mut Animation) {
        while reader.remaining() >= RiffChunk::HEADER_SIZE {
            let Ok(chunk) = RiffChunk::read(reader) else {
                break;
            };

            match &chunk.id {
                TITLE_CHUNK => ani.title = read_zstr(chunk.data),
                AUTHOR_CHUNK => ani.author = read_zstr(chunk.data),
                _ => {}
            }
        }
    }
}

fn read_zstr(data: &[u8]) -> Option<String> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let text = String::from_utf8_lossy(&data[..end]).trim().to_string();
    (!text.is_empty()).then_some(text)
}
