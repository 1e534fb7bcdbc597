// Library exports for curconvert

pub mod cli;
pub mod config;
pub mod pipeline;

// Re-export commonly used types from pipeline
pub use pipeline::decode::{
    CursorFormat, DecodeError, DecodeOptions, ParsedCursor, ResizeFilter, decode,
    decode_file, decode_with_extension,
};
