//! AMF0 script data, decoded with `scuffle-amf0`.

use bytes::Bytes;
use scuffle_amf0::{Amf0Decoder as Amf0Reader, Amf0Value};

use super::{ScriptData, ScriptDecoder, ScriptError};

/// Object-end sequence some muxers append after the last entry.
const TRAILING_END: [u8; 3] = [0x00, 0x00, 0x09];

/// An owned script data value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Number(f64),
    Boolean(bool),
    String(String),
    /// Objects and ECMA arrays alike.
    Object(Vec<(String, ScriptValue)>),
    Null,
    /// A value kind the metadata model does not carry.
    Unsupported,
}

impl ScriptValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_properties(&self) -> Option<&[(String, ScriptValue)]> {
        match self {
            Self::Object(props) => Some(props),
            _ => None,
        }
    }
}

impl From<&Amf0Value<'_>> for ScriptValue {
    fn from(value: &Amf0Value<'_>) -> Self {
        match value {
            Amf0Value::Number(n) => Self::Number(*n),
            Amf0Value::Boolean(b) => Self::Boolean(*b),
            Amf0Value::String(s) => Self::String(s.to_string()),
            Amf0Value::Object(props) => Self::Object(
                props
                    .iter()
                    .map(|(key, value)| (key.to_string(), ScriptValue::from(value)))
                    .collect(),
            ),
            Amf0Value::Null => Self::Null,
            _ => Self::Unsupported,
        }
    }
}

/// The standard script data decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Amf0Decoder;

impl ScriptDecoder for Amf0Decoder {
    fn decode(&self, body: Bytes) -> Result<ScriptData, ScriptError> {
        let values = match read_values(&body) {
            Ok(values) => values,
            Err(e) if body.ends_with(&TRAILING_END) => {
                tracing::trace!("Retrying script body without trailing end marker: {}", e);
                read_values(&body[..body.len() - TRAILING_END.len()])?
            }
            Err(e) => return Err(e),
        };

        let mut data = ScriptData::default();
        let mut values = values.into_iter();
        while let Some(name) = values.next() {
            let name = match name {
                ScriptValue::String(name) => name,
                other => return Err(ScriptError::InvalidName(format!("{:?}", other))),
            };
            let value = values
                .next()
                .ok_or_else(|| ScriptError::MissingValue(name.clone()))?;
            data.entries.insert(name, value);
        }

        Ok(data)
    }
}

fn read_values(buf: &[u8]) -> Result<Vec<ScriptValue>, ScriptError> {
    let values = Amf0Reader::new(buf)
        .decode_all()
        .map_err(|e| ScriptError::Amf0(e.to_string()))?;
    Ok(values.iter().map(ScriptValue::from).collect())
}
