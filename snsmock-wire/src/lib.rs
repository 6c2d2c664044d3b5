//! # snsmock-wire
//!
//! Wire codec for snsmock.
//!
//! This crate provides:
//! - Decoding of the AWS query-style form-encoded request body
//! - Action resolution from the `Action` field or `X-Amz-Target` header
//! - Typed `Publish` and `CreateTopic` request views
//! - XML success and error envelopes bit-compatible with the SNS SDK

pub mod form;
pub mod xml;

pub use form::{resolve_action, CreateTopicRequest, FormBody, PublishRequest};
pub use xml::{create_topic_success, error_envelope, publish_success, RequestId};

/// XML namespace stamped on every response envelope.
pub const SNS_XMLNS: &str = "http://sns.amazonaws.com/doc/2010-03-31/";

/// Content type of every SDK-facing response.
pub const CONTENT_TYPE_XML: &str = "text/xml";
