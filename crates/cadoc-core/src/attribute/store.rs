//! Per-label attribute storage and the attribute operations on `LabelTree`.

use std::collections::{btree_map, BTreeMap};

use crate::error::CoreError;
use crate::tree::LabelTree;
use crate::types::LabelId;

use super::types::{Attribute, AttributeId};

/// The attributes attached to one label, keyed by type id.
///
/// Iteration is ordered by type id, which keeps dumps and encoded
/// containers deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attributes: BTreeMap<AttributeId, Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `attribute`, returning the value it replaced, if any.
    pub fn insert(&mut self, attribute: Attribute) -> Option<Attribute> {
        self.attributes.insert(attribute.id(), attribute)
    }

    pub fn get(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes.get(&id)
    }

    pub fn remove(&mut self, id: AttributeId) -> Option<Attribute> {
        self.attributes.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> Attributes<'_> {
        Attributes {
            inner: self.attributes.values(),
        }
    }
}

/// Iterator over the attributes of a label, ordered by type id.
pub struct Attributes<'a> {
    inner: btree_map::Values<'a, AttributeId, Attribute>,
}

impl<'a> Iterator for Attributes<'a> {
    type Item = &'a Attribute;

    fn next(&mut self) -> Option<&'a Attribute> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Attributes<'_> {}

// ==============================================================================
// Label-level attribute operations
// ==============================================================================

impl LabelTree {
    /// Attach `attribute` to `label`, replacing any attribute of the same kind.
    pub fn add_attribute(&mut self, label: LabelId, attribute: Attribute) {
        let id = attribute.id();
        if self.node_mut(label).attributes.insert(attribute).is_some() {
            tracing::trace!(entry = %self.entry_of(label), attribute = %id, "replaced attribute");
        }
    }

    pub fn find_attribute(&self, label: LabelId, id: AttributeId) -> Result<&Attribute, CoreError> {
        self.node(label)
            .attributes
            .get(id)
            .ok_or_else(|| CoreError::attribute_not_found(&self.entry_of(label).to_string(), id))
    }

    pub fn has_attribute(&self, label: LabelId) -> bool {
        !self.node(label).attributes.is_empty()
    }

    pub fn attribute_count(&self, label: LabelId) -> usize {
        self.node(label).attributes.len()
    }

    /// Detach and return the attribute of kind `id`.
    pub fn forget_attribute(&mut self, label: LabelId, id: AttributeId) -> Result<Attribute, CoreError> {
        match self.node_mut(label).attributes.remove(id) {
            Some(removed) => Ok(removed),
            None => Err(CoreError::attribute_not_found(
                &self.entry_of(label).to_string(),
                id,
            )),
        }
    }

    pub fn attributes_of(&self, label: LabelId) -> Attributes<'_> {
        self.node(label).attributes.iter()
    }

    /// Title a label with a name attribute.
    pub fn set_name(&mut self, label: LabelId, name: impl Into<String>) {
        self.add_attribute(label, Attribute::Name(name.into()));
    }

    pub fn name_of(&self, label: LabelId) -> Option<&str> {
        self.node(label)
            .attributes
            .get(AttributeId::NAME)
            .and_then(Attribute::as_name)
    }
}
