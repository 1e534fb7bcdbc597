// Error taxonomy for cursor decoding

use std::path::PathBuf;

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated input: needed {needed} bytes at offset {offset}, only {remaining} left")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("position {target} is out of range for a {len} byte buffer")]
    OutOfRange { target: u64, len: usize },

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("decoding failed: {0}")]
    DecodingFailed(#[from] image::ImageError),

    /// Only produced by the file-level helpers, never by the byte decoders.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DecodeError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TruncatedInput { .. } => "truncated_input",
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidFormat(_) => "invalid_format",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::DecodingFailed(_) => "decoding_failed",
            Self::Io { .. } => "io",
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = DecodeError::TruncatedInput {
            offset: 4,
            needed: 2,
            remaining: 1,
        };
        assert_eq!(err.kind(), "truncated_input");
        assert!(err.to_string().contains("needed 2 bytes at offset 4"));

        assert_eq!(DecodeError::invalid("bad magic").kind(), "invalid_format");
        assert_eq!(
            DecodeError::UnsupportedFormat("bmp".into()).to_string(),
            "unsupported format: bmp"
        );
    }
}
