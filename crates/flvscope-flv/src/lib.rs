//! flvscope-flv: streaming FLV tag decoding
//!
//! This crate turns a forward-only byte stream (a file, an HTTP body, a pipe)
//! into a lazy sequence of typed FLV tags without ever seeking or buffering
//! more than the tag currently being decoded.
//!
//! # Modules
//!
//! - `header` - The 9-byte container header and its flags
//! - `tag` - Tag headers, audio/video codec headers, and scoped payload bodies
//! - `script` - Script data (`onMetaData`) decoding via AMF0
//! - `decoder` - The sequential [`FlvDecoder`]
//!
//! # Framing
//!
//! FLV has no resynchronisation markers: the position of every tag is derived
//! from the cumulative number of bytes consumed. Audio, video and unknown tags
//! therefore expose their codec bytes as a [`Payload`] that mutably borrows the
//! decoder. The next tag cannot be requested while a payload is alive, and a
//! dropped payload discards whatever was not read.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use flvscope_flv::{FlvDecoder, TagData};
//!
//! let file = BufReader::new(File::open("capture.flv")?);
//! let mut decoder = FlvDecoder::new(file)?;
//!
//! while let Some(tag) = decoder.next_tag()? {
//!     if let TagData::Video(video) = &tag.data {
//!         println!("{}ms {:?}", tag.header.timestamp, video.header.frame_type);
//!     }
//!     tag.finish()?;
//! }
//! # Ok::<(), flvscope_flv::Error>(())
//! ```

pub mod decoder;
pub mod error;
pub mod header;
pub mod script;
pub mod tag;

pub use decoder::FlvDecoder;
pub use error::{Error, Result};
pub use header::FlvHeader;
pub use script::{Amf0Decoder, ScriptData, ScriptDecoder, ScriptError, ScriptValue};
pub use tag::{Payload, Tag, TagData, TagHeader, TagType};
