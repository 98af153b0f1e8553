//! `LabelTree` — the hierarchical label namespace of a document.
//!
//! Labels live in an arena owned by the tree and are addressed by
//! [`LabelId`] handles. Every label exclusively owns its child map, ordered
//! by tag, and its [`AttributeSet`]. Labels are never removed, so handles
//! and entries stay stable for the lifetime of the tree.
//!
//! Traversal ([`LabelTree::children_of`], [`LabelTree::descendants_of`])
//! borrows the tree, which statically rules out structural mutation while
//! an iterator is alive. Collect the handles first to mutate while walking.
//!
//! Methods taking a `LabelId` panic if the handle was issued by another tree.

use std::collections::{btree_map, BTreeMap};

use crate::attribute::AttributeSet;
use crate::error::CoreError;
use crate::types::{Entry, LabelId, Tag, ROOT_TAG};

pub(crate) struct LabelNode {
    pub(crate) tag: Tag,
    pub(crate) parent: Option<LabelId>,
    pub(crate) children: BTreeMap<Tag, LabelId>,
    pub(crate) attributes: AttributeSet,
}

impl LabelNode {
    fn new(tag: Tag, parent: Option<LabelId>) -> Self {
        Self {
            tag,
            parent,
            children: BTreeMap::new(),
            attributes: AttributeSet::new(),
        }
    }
}

pub struct LabelTree {
    nodes: Vec<LabelNode>,
}

impl Default for LabelTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelTree {
    /// Create a tree holding only its root label (tag 0).
    pub fn new() -> Self {
        Self {
            nodes: vec![LabelNode::new(ROOT_TAG, None)],
        }
    }

    // ========================================================================
    // Structure queries
    // ========================================================================

    pub fn root(&self) -> LabelId {
        LabelId(0)
    }

    /// Total number of labels, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tag_of(&self, label: LabelId) -> Tag {
        self.node(label).tag
    }

    pub fn is_root(&self, label: LabelId) -> bool {
        self.node(label).parent.is_none()
    }

    pub fn father(&self, label: LabelId) -> Result<LabelId, CoreError> {
        self.node(label)
            .parent
            .ok_or_else(|| CoreError::NoParent(self.entry_of(label).to_string()))
    }

    /// Number of ancestors; the root has depth 0.
    pub fn depth_of(&self, label: LabelId) -> usize {
        self.ancestors(label).count()
    }

    /// The tag path from the root down to `label`.
    pub fn entry_of(&self, label: LabelId) -> Entry {
        let mut tags: Vec<Tag> = std::iter::once(label)
            .chain(self.ancestors(label))
            .map(|l| self.node(l).tag)
            .collect();
        tags.reverse();
        Entry::from_path(tags)
    }

    pub fn child_count(&self, label: LabelId) -> usize {
        self.node(label).children.len()
    }

    /// Non-mutating lookup of an existing child.
    pub fn child(&self, parent: LabelId, tag: Tag) -> Option<LabelId> {
        self.node(parent).children.get(&tag).copied()
    }

    /// Resolve an entry to an existing label without creating anything.
    pub fn find_label(&self, entry: &Entry) -> Option<LabelId> {
        entry.tags()[1..]
            .iter()
            .try_fold(self.root(), |label, &tag| self.child(label, tag))
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Direct children of `label` in increasing tag order.
    pub fn children_of(&self, label: LabelId) -> Children<'_> {
        Children {
            inner: self.node(label).children.values(),
        }
    }

    /// Every label below `label` (not including it), in pre-order with
    /// siblings visited in tag order.
    pub fn descendants_of(&self, label: LabelId) -> Descendants<'_> {
        let mut stack: Vec<LabelId> = self.children_of(label).collect();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    // ========================================================================
    // Label creation
    // ========================================================================

    /// Create a child under `parent` with the next unused tag: one past the
    /// largest tag already present, or 1 for a childless parent.
    pub fn new_child(&mut self, parent: LabelId) -> Result<LabelId, CoreError> {
        let last = self
            .node(parent)
            .children
            .keys()
            .next_back()
            .copied()
            .unwrap_or(ROOT_TAG);
        let tag = last
            .checked_add(1)
            .ok_or(CoreError::InvalidTag(u64::from(last) + 1))?;
        self.insert_child(parent, tag)
    }

    /// Look up the child of `parent` with `tag`. When it does not exist it
    /// is created if `create_if_missing` is set; otherwise `NotFound`.
    pub fn find_child(
        &mut self,
        parent: LabelId,
        tag: Tag,
        create_if_missing: bool,
    ) -> Result<LabelId, CoreError> {
        if tag == ROOT_TAG {
            return Err(CoreError::InvalidTag(u64::from(tag)));
        }
        if let Some(existing) = self.child(parent, tag) {
            return Ok(existing);
        }
        if !create_if_missing {
            return Err(CoreError::child_not_found(
                &self.entry_of(parent).to_string(),
                tag,
            ));
        }
        self.insert_child(parent, tag)
    }

    /// Resolve an entry to a label, creating missing labels along the path
    /// when `create_if_missing` is set.
    pub fn label_at(&mut self, entry: &Entry, create_if_missing: bool) -> Result<LabelId, CoreError> {
        entry.tags()[1..]
            .iter()
            .try_fold(self.root(), |label, &tag| {
                self.find_child(label, tag, create_if_missing)
            })
    }

    /// Attach a fresh child with an explicit tag. Fails with `DuplicateTag`
    /// when the tag is taken, so two siblings can never share a tag.
    pub(crate) fn insert_child(&mut self, parent: LabelId, tag: Tag) -> Result<LabelId, CoreError> {
        if tag == ROOT_TAG {
            return Err(CoreError::InvalidTag(u64::from(tag)));
        }
        if self.node(parent).children.contains_key(&tag) {
            return Err(CoreError::DuplicateTag {
                parent: self.entry_of(parent).to_string(),
                tag,
            });
        }
        let id = next_label_id(self.nodes.len())?;
        self.node_mut(parent).children.insert(tag, id);
        self.nodes.push(LabelNode::new(tag, Some(parent)));
        tracing::trace!(entry = %self.entry_of(id), "created label");
        Ok(id)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    pub(crate) fn node(&self, label: LabelId) -> &LabelNode {
        &self.nodes[label.index()]
    }

    pub(crate) fn node_mut(&mut self, label: LabelId) -> &mut LabelNode {
        &mut self.nodes[label.index()]
    }

    fn ancestors(&self, label: LabelId) -> impl Iterator<Item = LabelId> + '_ {
        std::iter::successors(self.node(label).parent, |&l| self.node(l).parent)
    }
}

/// Handle for the label stored at arena slot `index`.
fn next_label_id(index: usize) -> Result<LabelId, CoreError> {
    u32::try_from(index)
        .map(LabelId)
        .map_err(|_| CoreError::LimitExceeded(format!("label tree is full at {index} labels")))
}

// ==============================================================================
// Iterators
// ==============================================================================

/// Iterator over the direct children of a label, in tag order.
pub struct Children<'a> {
    inner: btree_map::Values<'a, Tag, LabelId>,
}

impl Iterator for Children<'_> {
    type Item = LabelId;

    fn next(&mut self) -> Option<LabelId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<LabelId> {
        self.inner.next_back().copied()
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Pre-order iterator over every label below a starting label.
pub struct Descendants<'a> {
    tree: &'a LabelTree,
    stack: Vec<LabelId>,
}

impl Iterator for Descendants<'_> {
    type Item = LabelId;

    fn next(&mut self) -> Option<LabelId> {
        let label = self.stack.pop()?;
        self.stack.extend(self.tree.children_of(label).rev());
        Some(label)
    }
}
