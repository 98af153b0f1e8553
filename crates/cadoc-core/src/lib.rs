pub mod app;
pub mod attribute;
pub mod codec;
pub mod document;
pub mod error;
pub mod storage;
#[cfg(test)]
mod test_util;
pub mod tree;
pub mod types;

pub use app::Application;
pub use attribute::{Attribute, AttributeId, AttributeKind};
pub use codec::BinaryCodec;
pub use document::{Document, LabelSnapshot};
pub use error::CoreError;
pub use tree::LabelTree;
pub use types::{DecodeLimits, Entry, LabelId, Tag};
