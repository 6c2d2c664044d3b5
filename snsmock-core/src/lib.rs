//! # snsmock-core
//!
//! Core types for snsmock.
//!
//! This crate provides:
//! - The immutable captured message record and its attributes
//! - The closed error taxonomy shared by the store and the wire layer

pub mod error;
pub mod message;

pub use error::CaptureError;
pub use message::{CapturedMessage, MessageAttribute};
