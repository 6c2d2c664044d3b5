//! # snsmock-server
//!
//! HTTP server for snsmock.
//!
//! This crate provides:
//! - An HTTP listener with async connection handling
//! - The protocol adapter translating SDK publish requests into captured
//!   records and SDK-compatible XML responses
//! - The JSON verification API used by tests to assert on captures
//! - Layered configuration (defaults, YAML file, environment)

pub mod adapter;
pub mod config;
pub mod error;
pub mod query;
pub mod server;

pub use adapter::{PublishHandler, WireResponse};
pub use config::{CaptureConfig, Config, ConfigError, NetworkConfig};
pub use error::ServerError;
pub use query::{MessageFilter, QueryApi};
pub use server::{Router, Server, ServerConfig};
