//! Container bytes -> Document.

use sha2::{Digest, Sha256};

use crate::document::Document;
use crate::error::CoreError;
use crate::tree::LabelTree;
use crate::types::{DecodeLimits, LabelId, Tag, ROOT_TAG};

use super::format::{read_attribute, Cursor, HASH_LEN, HEADER_LEN, MAGIC, MIN_CONTAINER_LEN, VERSION};

/// A label whose children are still being read.
struct Frame {
    label: LabelId,
    remaining_children: usize,
    depth: usize,
}

/// Decode a container. `recognizes` decides whether the stored format name
/// is supported. A fresh tree is built and only returned once the whole
/// container has been validated.
pub(super) fn read_document(
    bytes: &[u8],
    recognizes: impl Fn(&str) -> bool,
    limits: &DecodeLimits,
) -> Result<Document, CoreError> {
    let _span = tracing::debug_span!("decode_document", bytes = bytes.len()).entered();

    if bytes.len() < MIN_CONTAINER_LEN {
        return Err(CoreError::CorruptData {
            offset: bytes.len(),
            message: format!(
                "container too small ({} bytes, need >= {MIN_CONTAINER_LEN})",
                bytes.len()
            ),
        });
    }
    if bytes[..MAGIC.len()] != MAGIC {
        return Err(CoreError::CorruptData {
            offset: 0,
            message: "bad magic bytes".into(),
        });
    }
    if bytes[MAGIC.len()] != VERSION {
        return Err(CoreError::CorruptData {
            offset: MAGIC.len(),
            message: format!("unsupported container version {}", bytes[MAGIC.len()]),
        });
    }

    let (content, stored_hash) = bytes.split_at(bytes.len() - HASH_LEN);
    let actual_hash = Sha256::digest(content);
    if actual_hash.as_slice() != stored_hash {
        return Err(CoreError::CorruptData {
            offset: content.len(),
            message: format!(
                "checksum mismatch (stored {}, computed {})",
                hex::encode(&stored_hash[..4]),
                hex::encode(&actual_hash[..4])
            ),
        });
    }

    let mut cursor = Cursor::new(content, HEADER_LEN);
    let format_name = cursor.read_string(limits.max_string_len)?;
    if !recognizes(&format_name) {
        return Err(CoreError::FormatMismatch(format_name));
    }

    let label_count = cursor.read_count("label count", limits.max_labels)?;
    let mut tree = LabelTree::new();

    let root = tree.root();
    let root_tag = read_tag(&mut cursor)?;
    if root_tag != ROOT_TAG {
        return Err(cursor.corrupt(format!("root label has tag {root_tag}, expected {ROOT_TAG}")));
    }
    let root_children = read_label_body(&mut cursor, &mut tree, root, label_count, limits)?;

    let mut decoded: usize = 1;
    let mut stack = vec![Frame {
        label: root,
        remaining_children: root_children,
        depth: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.remaining_children == 0 {
            stack.pop();
            continue;
        }
        frame.remaining_children -= 1;
        let parent = frame.label;
        let depth = frame.depth + 1;

        if depth > limits.max_depth {
            return Err(cursor.corrupt(format!("label depth exceeds limit {}", limits.max_depth)));
        }
        decoded += 1;
        if decoded > label_count {
            return Err(cursor.corrupt(format!("more labels than the declared {label_count}")));
        }

        let tag = read_tag(&mut cursor)?;
        if tag == ROOT_TAG {
            return Err(cursor.corrupt("non-root label has tag 0"));
        }
        let label = tree.insert_child(parent, tag).map_err(|e| match e {
            CoreError::DuplicateTag { .. } => cursor.corrupt(e.to_string()),
            other => other,
        })?;
        let children = read_label_body(&mut cursor, &mut tree, label, label_count, limits)?;
        stack.push(Frame {
            label,
            remaining_children: children,
            depth,
        });
    }

    if decoded != label_count {
        return Err(cursor.corrupt(format!(
            "declared {label_count} labels but found {decoded}"
        )));
    }
    if !cursor.is_at_end() {
        return Err(cursor.corrupt("trailing bytes after label tree"));
    }

    tracing::debug!(format = %format_name, labels = decoded, "document decoded");
    Ok(Document::from_parts(format_name, tree))
}

fn read_tag(cursor: &mut Cursor<'_>) -> Result<Tag, CoreError> {
    let raw = cursor.read_varint()?;
    Tag::try_from(raw).map_err(|_| cursor.corrupt(format!("tag {raw} out of range")))
}

/// Read the attributes of `label` and return its declared child count.
fn read_label_body(
    cursor: &mut Cursor<'_>,
    tree: &mut LabelTree,
    label: LabelId,
    label_count: usize,
    limits: &DecodeLimits,
) -> Result<usize, CoreError> {
    let attr_count = cursor.read_count("attribute count", limits.max_attributes_per_label)?;
    for _ in 0..attr_count {
        let attribute = read_attribute(cursor, limits.max_string_len)?;
        let id = attribute.id();
        if tree.node_mut(label).attributes.insert(attribute).is_some() {
            return Err(cursor.corrupt(format!("attribute {id} repeated on one label")));
        }
    }
    cursor.read_count("child count", label_count)
}
