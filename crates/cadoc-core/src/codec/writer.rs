//! Document -> container bytes.

use sha2::{Digest, Sha256};

use crate::attribute::Attribute;
use crate::document::Document;
use crate::error::CoreError;
use crate::types::DecodeLimits;

use super::format::{write_attribute, write_len_prefixed, MAGIC, VERSION};
use super::varint::encode_varint;

/// Encode `doc` into a complete container. The walk is an explicit-stack
/// pre-order over children in tag order, so equal documents always produce
/// identical bytes.
///
/// `limits` are the ones the matching decoder enforces; a document outside
/// them fails with `LimitExceeded` and nothing is produced.
pub(super) fn write_document(doc: &Document, limits: &DecodeLimits) -> Result<Vec<u8>, CoreError> {
    let tree = doc.tree();
    let _span = tracing::debug_span!("encode_document", labels = tree.len()).entered();

    if tree.len() > limits.max_labels {
        return Err(CoreError::LimitExceeded(format!(
            "{} labels, limit {}",
            tree.len(),
            limits.max_labels
        )));
    }
    check_string_len("format name", doc.format_name(), limits)?;

    let mut buf = Vec::new();
    buf.extend_from_slice(&MAGIC);
    buf.push(VERSION);
    write_len_prefixed(doc.format_name().as_bytes(), &mut buf);
    encode_varint(tree.len() as u64, &mut buf);

    let mut stack = vec![(tree.root(), 0usize)];
    while let Some((label, depth)) = stack.pop() {
        if depth > limits.max_depth {
            return Err(CoreError::LimitExceeded(format!(
                "label {} is at depth {depth}, limit {}",
                tree.entry_of(label),
                limits.max_depth
            )));
        }
        let attribute_count = tree.attribute_count(label);
        if attribute_count > limits.max_attributes_per_label {
            return Err(CoreError::LimitExceeded(format!(
                "label {} has {attribute_count} attributes, limit {}",
                tree.entry_of(label),
                limits.max_attributes_per_label
            )));
        }

        encode_varint(u64::from(tree.tag_of(label)), &mut buf);
        encode_varint(attribute_count as u64, &mut buf);
        for attribute in tree.attributes_of(label) {
            if let Attribute::Name(name) = attribute {
                check_string_len("name", name, limits)?;
            }
            write_attribute(attribute, &mut buf);
        }
        encode_varint(tree.child_count(label) as u64, &mut buf);
        stack.extend(tree.children_of(label).rev().map(|child| (child, depth + 1)));
    }

    let digest = Sha256::digest(&buf);
    buf.extend_from_slice(&digest);

    tracing::debug!(bytes = buf.len(), "document encoded");
    Ok(buf)
}

fn check_string_len(what: &str, value: &str, limits: &DecodeLimits) -> Result<(), CoreError> {
    if value.len() > limits.max_string_len {
        return Err(CoreError::LimitExceeded(format!(
            "{what} is {} bytes, limit {}",
            value.len(),
            limits.max_string_len
        )));
    }
    Ok(())
}
