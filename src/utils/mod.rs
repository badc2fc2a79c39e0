//! Utility functions and helpers
//!
//! This module contains the hashing and canonical-serialization helpers
//! used by block construction and proof-of-work.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest};

pub use serialization::canonical_json;
