//! Script data tags.
//!
//! A script data body is a sequence of `(name, value)` pairs; in practice a
//! single `onMetaData` entry holding an ECMA array of stream properties. The
//! decoder reads the whole body and hands it to a [`ScriptDecoder`], AMF0 by
//! default.

mod amf0;

pub use amf0::{Amf0Decoder, ScriptValue};

use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

/// Decoded script data entries, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptData {
    pub entries: HashMap<String, ScriptValue>,
}

impl ScriptData {
    pub fn get(&self, name: &str) -> Option<&ScriptValue> {
        self.entries.get(name)
    }

    /// The `onMetaData` properties, if present.
    pub fn metadata(&self) -> Option<&[(String, ScriptValue)]> {
        self.get("onMetaData").and_then(ScriptValue::as_properties)
    }

    /// Look up a numeric `onMetaData` property such as `duration` or `framerate`.
    pub fn metadata_number(&self, key: &str) -> Option<f64> {
        self.metadata()?
            .iter()
            .find(|(name, _)| name == key)
            .and_then(|(_, value)| value.as_number())
    }
}

/// Errors raised while decoding a script data body.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The AMF0 reader rejected the body.
    #[error("Invalid AMF0 script body: {0}")]
    Amf0(String),

    /// An entry name that is not a string.
    #[error("Expected string entry name, found {0}")]
    InvalidName(String),

    /// A trailing name with no value after it.
    #[error("Script entry {0:?} has no value")]
    MissingValue(String),
}

/// Decodes a complete script data body into named values.
pub trait ScriptDecoder {
    fn decode(&self, body: Bytes) -> Result<ScriptData, ScriptError>;
}
