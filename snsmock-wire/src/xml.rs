//! XML response envelopes.
//!
//! The three envelope shapes below are what the SNS SDK's response parser
//! expects; they are emitted without declaration or whitespace so the byte
//! shape stays stable across releases.

use crate::SNS_XMLNS;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use snsmock_core::CaptureError;
use std::fmt;
use std::io::Write;
use uuid::Uuid;

/// A freshly generated opaque token identifying one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Mints a new token.
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Emits the `Publish` success envelope.
pub fn publish_success(message_id: &str, request_id: &str) -> Result<Vec<u8>, CaptureError> {
    let mut writer = Writer::new(Vec::new());
    write(&mut writer, Event::Start(response_root("PublishResponse")))?;
    write(&mut writer, Event::Start(BytesStart::new("PublishResult")))?;
    text_element(&mut writer, "MessageId", message_id)?;
    write(&mut writer, Event::End(BytesEnd::new("PublishResult")))?;
    response_metadata(&mut writer, request_id)?;
    write(&mut writer, Event::End(BytesEnd::new("PublishResponse")))?;
    Ok(writer.into_inner())
}

/// Emits the `CreateTopic` success envelope.
pub fn create_topic_success(topic_arn: &str, request_id: &str) -> Result<Vec<u8>, CaptureError> {
    let mut writer = Writer::new(Vec::new());
    write(
        &mut writer,
        Event::Start(response_root("CreateTopicResponse")),
    )?;
    write(
        &mut writer,
        Event::Start(BytesStart::new("CreateTopicResult")),
    )?;
    text_element(&mut writer, "TopicArn", topic_arn)?;
    write(&mut writer, Event::End(BytesEnd::new("CreateTopicResult")))?;
    response_metadata(&mut writer, request_id)?;
    write(&mut writer, Event::End(BytesEnd::new("CreateTopicResponse")))?;
    Ok(writer.into_inner())
}

/// Emits the error envelope. `Type` is always `Sender`; the mock has no
/// receiver-side faults worth distinguishing.
pub fn error_envelope(
    code: &str,
    message: &str,
    request_id: &str,
) -> Result<Vec<u8>, CaptureError> {
    let mut writer = Writer::new(Vec::new());
    write(&mut writer, Event::Start(response_root("ErrorResponse")))?;
    write(&mut writer, Event::Start(BytesStart::new("Error")))?;
    text_element(&mut writer, "Type", "Sender")?;
    text_element(&mut writer, "Code", code)?;
    text_element(&mut writer, "Message", message)?;
    write(&mut writer, Event::End(BytesEnd::new("Error")))?;
    text_element(&mut writer, "RequestId", request_id)?;
    write(&mut writer, Event::End(BytesEnd::new("ErrorResponse")))?;
    Ok(writer.into_inner())
}

fn response_root(tag: &'static str) -> BytesStart<'static> {
    let mut root = BytesStart::new(tag);
    root.push_attribute(("xmlns", SNS_XMLNS));
    root
}

fn response_metadata<W: Write>(
    writer: &mut Writer<W>,
    request_id: &str,
) -> Result<(), CaptureError> {
    write(writer, Event::Start(BytesStart::new("ResponseMetadata")))?;
    text_element(writer, "RequestId", request_id)?;
    write(writer, Event::End(BytesEnd::new("ResponseMetadata")))
}

fn text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), CaptureError> {
    write(writer, Event::Start(BytesStart::new(tag)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(tag)))
}

fn write<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), CaptureError> {
    writer
        .write_event(event)
        .map_err(|e| CaptureError::internal(e.to_string()))
}
