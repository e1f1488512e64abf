//! Error types for flvscope-flv.

use std::io;
use thiserror::Error;

use crate::script::ScriptError;
use crate::tag::TagType;

/// Result type for flvscope-flv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for FLV decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error, including a stream that ended inside a record.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the `FLV` signature.
    #[error("Invalid FLV signature: {0:02x?}")]
    InvalidSignature([u8; 3]),

    /// The container header is structurally invalid.
    #[error("Invalid FLV header: {0}")]
    InvalidHeader(String),

    /// A tag whose declared payload cannot hold its codec header.
    ///
    /// The payload has been drained; decoding can continue.
    #[error("Malformed {tag_type} tag at {timestamp}ms: {reason}")]
    MalformedTag {
        tag_type: TagType,
        timestamp: u32,
        reason: String,
    },

    /// The script data body was read in full but could not be decoded.
    #[error("Script data error at {timestamp}ms: {source}")]
    Script {
        timestamp: u32,
        #[source]
        source: ScriptError,
    },
}

impl Error {
    /// Create an invalid header error.
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Create a malformed tag error.
    pub fn malformed(tag_type: TagType, timestamp: u32, reason: impl Into<String>) -> Self {
        Self::MalformedTag {
            tag_type,
            timestamp,
            reason: reason.into(),
        }
    }

    /// Whether the stream framing is still intact after this error.
    ///
    /// Recoverable errors are raised only after the tag's declared payload
    /// was consumed, so the next [`FlvDecoder::next_tag`](crate::FlvDecoder::next_tag)
    /// call starts on a tag boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedTag { .. } | Self::Script { .. })
    }

    /// Whether this is a container format error (bad signature or header).
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::InvalidSignature(_) | Self::InvalidHeader(_))
    }
}
