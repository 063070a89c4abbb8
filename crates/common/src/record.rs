use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One stored value together with the identity it lives under.
///
/// The identity triple `(bucket_type, bucket, key)` is carried verbatim,
/// unescaped. Anything that persists a record (file layout, stream line) must
/// be able to rebuild the exact triple without an external index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub bucket_type: String,
    pub bucket: String,
    pub key: String,
    /// Opaque payload. Serialized as standard base64 so a record fits on one line.
    #[serde(with = "base64_bytes")]
    pub value: Bytes,
}

impl Record {
    pub fn new(
        bucket_type: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Bytes>,
    ) -> Self {
        Self {
            bucket_type: bucket_type.into(),
            bucket: bucket.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Encode as a single JSON line, newline included.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Decode one line produced by [`Record::to_line`]. Trailing whitespace is ignored.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bucket_type, self.bucket, self.key)
    }
}

mod base64_bytes {
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
