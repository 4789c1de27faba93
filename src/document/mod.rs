//! Document model for pallas
//!
//! Documents are ordered maps from field names to a closed set of value
//! types. The reserved `id` field is assigned by the store on insert and is
//! never part of the persisted payload.

mod document;
mod value;

pub use document::{Document, ID_FIELD};
pub use value::Value;
