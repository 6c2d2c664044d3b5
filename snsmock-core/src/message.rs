//! Captured message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named typed attribute attached to a captured message.
///
/// `string_value` and `binary_value` are mutually exclusive in presence;
/// either may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttribute {
    /// Attribute name, unique within a message.
    pub name: String,

    /// Declared data type: `String`, `Number`, `Binary`, or an array form.
    pub data_type: String,

    /// String payload (for `String` and `Number` types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    /// Binary payload, base64 in JSON.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_opt"
    )]
    pub binary_value: Option<Vec<u8>>,
}

impl MessageAttribute {
    /// Creates a string-valued attribute.
    pub fn string(
        name: impl Into<String>,
        data_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    /// Creates a binary-valued attribute.
    pub fn binary(name: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data_type: "Binary".to_string(),
            string_value: None,
            binary_value: Some(value),
        }
    }
}

/// One captured publish. Immutable after creation.
///
/// The JSON encoding is stable in field set; optional fields are omitted
/// when absent and binary payloads are base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedMessage {
    /// Opaque id, unique per store instance, minted at insert.
    pub id: String,

    /// Destination topic. ARN-shaped in practice, opaque here.
    pub topic: String,

    /// UTF-8 payload. May itself be JSON; never parsed.
    pub body: String,

    /// Optional subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Optional structure tag (e.g. `json` for multi-protocol payloads).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,

    /// FIFO deduplication token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedup_id: Option<String>,

    /// FIFO ordering group. Stored, not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Ordered attributes; names are unique.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<MessageAttribute>,

    /// Wall-clock instant assigned when the record was minted.
    pub timestamp: DateTime<Utc>,

    /// Verbatim request body bytes, retained for forensic inspection.
    /// Never re-encoded; base64 in JSON.
    #[serde(with = "base64_bytes")]
    pub raw_payload: Vec<u8>,
}

impl CapturedMessage {
    /// Creates a record with the required fields; optional fields start
    /// absent and are set with the `with_*` builders.
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        body: impl Into<String>,
        timestamp: DateTime<Utc>,
        raw_payload: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            body: body.into(),
            subject: None,
            structure: None,
            dedup_id: None,
            group_id: None,
            attributes: Vec::new(),
            timestamp,
            raw_payload,
        }
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    /// Sets the structure tag.
    pub fn with_structure(mut self, structure: Option<String>) -> Self {
        self.structure = structure;
        self
    }

    /// Sets the deduplication id.
    pub fn with_dedup_id(mut self, dedup_id: Option<String>) -> Self {
        self.dedup_id = dedup_id;
        self
    }

    /// Sets the ordering group id.
    pub fn with_group_id(mut self, group_id: Option<String>) -> Self {
        self.group_id = group_id;
        self
    }

    /// Sets the attributes.
    pub fn with_attributes(mut self, attributes: Vec<MessageAttribute>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Serde adapter for base64-encoded byte payloads.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional base64-encoded byte payloads.
mod base64_opt {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
