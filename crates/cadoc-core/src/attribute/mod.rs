//! Typed attributes attached to labels.
//!
//! Each label carries an [`AttributeSet`] keyed by [`AttributeId`], a fixed
//! GUID per attribute kind. Adding an attribute whose kind is already present
//! replaces the previous value.

mod store;
mod types;

pub use store::{AttributeSet, Attributes};
pub use types::{Attribute, AttributeId, AttributeKind};
