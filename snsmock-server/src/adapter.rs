//! Protocol adapter for the mocked publish API.
//!
//! Translates `(headers, body bytes)` into a captured record plus an
//! SDK-compatible XML response. The adapter is synchronous once invoked
//! with decoded bytes and never panics on malformed input.

use crate::error::http_status;
use chrono::Utc;
use hyper::StatusCode;
use snsmock_core::{CaptureError, CapturedMessage};
use snsmock_store::CaptureStore;
use snsmock_wire::form::{resolve_action, CreateTopicRequest, FormBody, PublishRequest};
use snsmock_wire::xml::{create_topic_success, error_envelope, publish_success, RequestId};
use snsmock_wire::CONTENT_TYPE_XML;
use std::sync::Arc;
use uuid::Uuid;

/// Region stamped into synthesized topic ARNs.
const STUB_REGION: &str = "us-east-1";

/// Account stamped into synthesized topic ARNs.
const STUB_ACCOUNT: &str = "000000000000";

/// One fully formed HTTP response: status, content type, body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Handles the SDK-facing `POST /` endpoint.
pub struct PublishHandler {
    store: Arc<CaptureStore>,
}

impl PublishHandler {
    /// Creates a handler capturing into `store`.
    pub fn new(store: Arc<CaptureStore>) -> Self {
        Self { store }
    }

    /// Dispatches one request on its resolved action.
    ///
    /// `target_header` is the raw `X-Amz-Target` value, consulted only
    /// when the form body carries no `Action` field.
    pub fn handle(&self, target_header: Option<&str>, body: &[u8]) -> WireResponse {
        let form = FormBody::parse(body);
        let Some(action) = resolve_action(&form, target_header) else {
            return error_response(&CaptureError::MissingAction);
        };

        match action.as_str() {
            "Publish" => self.publish(&form, body),
            "CreateTopic" => self.create_topic(&form),
            _ => error_response(&CaptureError::InvalidAction { action }),
        }
    }

    fn publish(&self, form: &FormBody, raw_payload: &[u8]) -> WireResponse {
        let request = match PublishRequest::from_form(form) {
            Ok(request) => request,
            Err(e) => return error_response(&e),
        };

        // A non-empty dedup id collapses repeated publishes within the
        // topic onto the first captured record and its message id.
        if let Some(dedup_id) = request.dedup_id.as_deref() {
            if let Some(existing) = self.store.find_duplicate(&request.topic_arn, dedup_id) {
                tracing::debug!(
                    topic = %request.topic_arn,
                    dedup_id,
                    message_id = %existing.id,
                    "publish deduplicated"
                );
                return xml_response(publish_success(&existing.id, RequestId::mint().as_str()));
            }
        }

        let id = Uuid::new_v4().to_string();
        let message = CapturedMessage::new(
            id.clone(),
            request.topic_arn,
            request.message,
            Utc::now(),
            raw_payload.to_vec(),
        )
        .with_subject(request.subject)
        .with_structure(request.message_structure)
        .with_dedup_id(request.dedup_id)
        .with_group_id(request.group_id)
        .with_attributes(request.attributes);

        let topic = message.topic.clone();
        if let Err(e) = self.store.add(message) {
            return error_response(&CaptureError::internal(e.to_string()));
        }

        tracing::debug!(%topic, message_id = %id, "message captured");
        xml_response(publish_success(&id, RequestId::mint().as_str()))
    }

    fn create_topic(&self, form: &FormBody) -> WireResponse {
        let request = match CreateTopicRequest::from_form(form) {
            Ok(request) => request,
            Err(e) => return error_response(&e),
        };

        // The shape matters, the values do not: a fixed stub region and
        // account make the ARN deterministic for assertions.
        let topic_arn = format!("arn:aws:sns:{STUB_REGION}:{STUB_ACCOUNT}:{}", request.name);
        tracing::debug!(%topic_arn, "topic synthesized");
        xml_response(create_topic_success(&topic_arn, RequestId::mint().as_str()))
    }
}

/// Wraps a successfully emitted envelope, degrading to a 500 if emission
/// itself failed.
fn xml_response(envelope: Result<Vec<u8>, CaptureError>) -> WireResponse {
    match envelope {
        Ok(body) => WireResponse {
            status: StatusCode::OK,
            content_type: CONTENT_TYPE_XML,
            body,
        },
        Err(e) => error_response(&e),
    }
}

/// Builds the XML error envelope for `error` with its mapped status.
pub(crate) fn error_response(error: &CaptureError) -> WireResponse {
    WireResponse {
        status: http_status(error),
        content_type: CONTENT_TYPE_XML,
        body: error_envelope(error.code(), &error.to_string(), RequestId::mint().as_str())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> (Arc<CaptureStore>, PublishHandler) {
        let store = Arc::new(CaptureStore::new());
        let handler = PublishHandler::new(store.clone());
        (store, handler)
    }

    fn body_text(response: &WireResponse) -> &str {
        std::str::from_utf8(&response.body).unwrap()
    }

    fn message_id(response: &WireResponse) -> String {
        let text = body_text(response);
        let start = text.find("<MessageId>").expect("no MessageId element") + 11;
        let end = text.find("</MessageId>").unwrap();
        text[start..end].to_string()
    }

    #[test]
    fn test_publish_captures_and_responds() {
        let (store, handler) = handler();
        let body = b"Action=Publish&TopicArn=arn:aws:sns:us-east-1:123456789012:t1&Message=hello";
        let response = handler.handle(None, body);

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type, "text/xml");
        assert!(body_text(&response).contains("<MessageId>"));

        let captured = store
            .get_by_topic("arn:aws:sns:us-east-1:123456789012:t1")
            .unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].body, "hello");
        assert_eq!(captured[0].id, message_id(&response));
        assert_eq!(captured[0].raw_payload, body.to_vec());
    }

    #[test]
    fn test_publish_missing_topic_arn() {
        let (store, handler) = handler();
        let response = handler.handle(None, b"Action=Publish&Message=x");

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let text = body_text(&response);
        assert!(text.contains("<Code>InvalidParameter</Code>"));
        assert!(text.contains("TopicArn"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_publish_missing_message() {
        let (_, handler) = handler();
        let response = handler.handle(None, b"Action=Publish&TopicArn=t");

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(body_text(&response).contains("Message"));
    }

    #[test]
    fn test_publish_dedup_replays_first_message_id() {
        let (store, handler) = handler();
        let body = b"Action=Publish&TopicArn=t.fifo&Message=a&MessageDeduplicationId=d1";

        let first = handler.handle(None, body);
        let second = handler.handle(None, body);

        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(second.status, StatusCode::OK);
        assert_eq!(message_id(&first), message_id(&second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_publish_dedup_is_per_topic() {
        let (store, handler) = handler();
        handler.handle(None, b"Action=Publish&TopicArn=t1&Message=a&MessageDeduplicationId=d1");
        handler.handle(None, b"Action=Publish&TopicArn=t2&Message=a&MessageDeduplicationId=d1");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_publish_optional_fields_mapped_through() {
        let (store, handler) = handler();
        handler.handle(
            None,
            b"Action=Publish&TopicArn=t&Message=m&Subject=s&MessageStructure=json\
              &MessageGroupId=g-1\
              &MessageAttributes.entry.1.Name=k\
              &MessageAttributes.entry.1.Value.DataType=String\
              &MessageAttributes.entry.1.Value.StringValue=v",
        );

        let captured = store.get_all();
        assert_eq!(captured.len(), 1);
        let message = &captured[0];
        assert_eq!(message.subject.as_deref(), Some("s"));
        assert_eq!(message.structure.as_deref(), Some("json"));
        assert_eq!(message.group_id.as_deref(), Some("g-1"));
        assert_eq!(message.attributes.len(), 1);
        assert_eq!(message.attributes[0].name, "k");
    }

    #[test]
    fn test_eviction_visible_through_adapter() {
        let store = Arc::new(CaptureStore::with_capacity(3).unwrap());
        let handler = PublishHandler::new(store.clone());

        for i in 1..=5 {
            let body = format!("Action=Publish&TopicArn=t&Message=m{i}");
            handler.handle(None, body.as_bytes());
        }

        let bodies: Vec<String> = store
            .get_by_topic("t")
            .unwrap()
            .iter()
            .map(|m| m.body.clone())
            .collect();
        assert_eq!(bodies, ["m3", "m4", "m5"]);
    }

    #[test]
    fn test_create_topic_synthesizes_arn() {
        let (store, handler) = handler();
        let response = handler.handle(None, b"Action=CreateTopic&Name=orders");

        assert_eq!(response.status, StatusCode::OK);
        assert!(body_text(&response)
            .contains("<TopicArn>arn:aws:sns:us-east-1:000000000000:orders</TopicArn>"));
        // No store mutation on create-topic.
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_topic_missing_name() {
        let (_, handler) = handler();
        let response = handler.handle(None, b"Action=CreateTopic");
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(body_text(&response).contains("Name"));
    }

    #[test]
    fn test_action_from_target_header() {
        let (store, handler) = handler();
        let response = handler.handle(
            Some("com.example.sns.Publish"),
            b"TopicArn=t&Message=hello",
        );

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_action() {
        let (_, handler) = handler();
        let response = handler.handle(None, b"TopicArn=t&Message=hello");

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let text = body_text(&response);
        assert!(text.contains("<Code>MissingAction</Code>"));
        assert!(text.contains("Could not find operation to perform."));
    }

    #[test]
    fn test_invalid_action_names_the_action() {
        let (_, handler) = handler();
        let response = handler.handle(None, b"Action=DeleteTopic&TopicArn=t");

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let text = body_text(&response);
        assert!(text.contains("<Code>InvalidAction</Code>"));
        assert!(text.contains("DeleteTopic"));
    }

    #[test]
    fn test_garbage_body_degenerates_to_missing_action() {
        let (_, handler) = handler();
        let response = handler.handle(None, b"\xff\xfe not a form at all");
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(body_text(&response).contains("MissingAction"));
    }
}
