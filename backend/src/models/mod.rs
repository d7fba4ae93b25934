//! # API Models
//!
//! This module defines the request and response structures for the REST API.
//! These are separate from database models so the wire format can follow
//! the established client contract independently of the storage layout.
//!
//! ## Organization
//!
//! - `requests.rs` - Incoming request bodies
//! - `responses.rs` - Outgoing response bodies
//!
//! ## Serialization
//!
//! All models use Serde for JSON serialization/deserialization. Field names
//! are fixed by existing clients: mostly snake_case, camelCase only for the
//! transfer body.

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
