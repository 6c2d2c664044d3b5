//! Decoding of AWS query-style form bodies.
//!
//! The SDK sends `application/x-www-form-urlencoded` bodies in which
//! repeated structures are flattened into dotted, 1-indexed keys, e.g.
//! `MessageAttributes.entry.2.Value.DataType`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use snsmock_core::{CaptureError, MessageAttribute};

/// A decoded form body: an ordered multimap of keys to values.
#[derive(Debug, Clone, Default)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    /// Decodes a form-encoded byte body.
    ///
    /// Malformed input degenerates to absent keys rather than failing;
    /// validation happens when a typed request view is built.
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// Returns the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first non-empty value for `key`.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Number of decoded pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no pairs were decoded.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Determines the requested action.
///
/// The `Action` form field wins; otherwise the substring after the last
/// `.` of the `X-Amz-Target` header value is used.
pub fn resolve_action(form: &FormBody, target_header: Option<&str>) -> Option<String> {
    if let Some(action) = form.get_non_empty("Action") {
        return Some(action.to_string());
    }
    target_header
        .and_then(|target| target.rsplit('.').next())
        .filter(|action| !action.is_empty())
        .map(str::to_string)
}

/// A validated `Publish` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub topic_arn: String,
    pub message: String,
    pub subject: Option<String>,
    pub message_structure: Option<String>,
    pub dedup_id: Option<String>,
    pub group_id: Option<String>,
    pub attributes: Vec<MessageAttribute>,
}

impl PublishRequest {
    /// Builds a publish request from a decoded form, validating required
    /// fields. Optional fields that are present but empty are treated as
    /// absent.
    pub fn from_form(form: &FormBody) -> Result<Self, CaptureError> {
        let topic_arn = form
            .get_non_empty("TopicArn")
            .ok_or_else(|| CaptureError::invalid_parameter("TopicArn"))?;
        let message = form
            .get_non_empty("Message")
            .ok_or_else(|| CaptureError::invalid_parameter("Message"))?;

        Ok(Self {
            topic_arn: topic_arn.to_string(),
            message: message.to_string(),
            subject: form.get_non_empty("Subject").map(str::to_string),
            message_structure: form.get_non_empty("MessageStructure").map(str::to_string),
            dedup_id: form
                .get_non_empty("MessageDeduplicationId")
                .map(str::to_string),
            group_id: form.get_non_empty("MessageGroupId").map(str::to_string),
            attributes: parse_attributes(form)?,
        })
    }
}

/// A validated `CreateTopic` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTopicRequest {
    pub name: String,
}

impl CreateTopicRequest {
    /// Builds a create-topic request from a decoded form.
    pub fn from_form(form: &FormBody) -> Result<Self, CaptureError> {
        let name = form
            .get_non_empty("Name")
            .ok_or_else(|| CaptureError::invalid_parameter("Name"))?;
        Ok(Self {
            name: name.to_string(),
        })
    }
}

/// Collects the indexed `MessageAttributes.entry.<n>.*` tuples.
///
/// Iteration begins at n=1 and stops at the first index with no `Name`.
fn parse_attributes(form: &FormBody) -> Result<Vec<MessageAttribute>, CaptureError> {
    let mut attributes = Vec::new();

    for n in 1.. {
        let prefix = format!("MessageAttributes.entry.{n}");
        let Some(name) = form.get_non_empty(&format!("{prefix}.Name")) else {
            break;
        };

        let data_type = form
            .get_non_empty(&format!("{prefix}.Value.DataType"))
            .ok_or_else(|| CaptureError::invalid_parameter(format!("{prefix}.Value.DataType")))?;

        let string_value = form
            .get(&format!("{prefix}.Value.StringValue"))
            .map(str::to_string);
        let binary_value = match form.get(&format!("{prefix}.Value.BinaryValue")) {
            Some(encoded) => Some(STANDARD.decode(encoded).map_err(|_| {
                CaptureError::invalid_parameter(format!("{prefix}.Value.BinaryValue"))
            })?),
            None => None,
        };

        if string_value.is_some() && binary_value.is_some() {
            return Err(CaptureError::invalid_parameter(format!("{prefix}.Value")));
        }

        attributes.push(MessageAttribute {
            name: name.to_string(),
            data_type: data_type.to_string(),
            string_value,
            binary_value,
        });
    }

    Ok(attributes)
}
