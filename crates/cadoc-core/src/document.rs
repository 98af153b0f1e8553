//! `Document` — a label tree plus the format name used to persist it.

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::error::CoreError;
use crate::tree::LabelTree;
use crate::types::{LabelId, Tag};

/// Tag of the conventional working label under the root.
pub const MAIN_TAG: Tag = 1;

pub struct Document {
    format_name: String,
    tree: LabelTree,
}

impl Document {
    /// Create an empty document (root label only) for the given format.
    pub fn create(format_name: impl Into<String>) -> Self {
        Self::from_parts(format_name.into(), LabelTree::new())
    }

    pub(crate) fn from_parts(format_name: String, tree: LabelTree) -> Self {
        Self { format_name, tree }
    }

    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    pub fn root(&self) -> LabelId {
        self.tree.root()
    }

    /// The application's working label, `0:1`, created on first access.
    pub fn main_label(&mut self) -> Result<LabelId, CoreError> {
        let root = self.tree.root();
        self.tree.find_child(root, MAIN_TAG, true)
    }

    pub fn tree(&self) -> &LabelTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut LabelTree {
        &mut self.tree
    }

    /// Owned structural view of the whole tree, one entry per label in
    /// pre-order (root first, siblings in tag order).
    pub fn snapshot(&self) -> Vec<LabelSnapshot> {
        LabelSnapshot::collect(&self.tree, self.tree.root())
    }

    /// Same format name, same tags in the same shape, same attribute values.
    /// Label handles are not compared.
    ///
    /// Both trees are walked in pre-order in lockstep; tag, attributes and
    /// child count agreeing at every step fix the shape.
    pub fn is_structurally_equal(&self, other: &Document) -> bool {
        if self.format_name != other.format_name || self.tree.len() != other.tree.len() {
            return false;
        }
        let (a, b) = (&self.tree, &other.tree);
        let ours = std::iter::once(a.root()).chain(a.descendants_of(a.root()));
        let theirs = std::iter::once(b.root()).chain(b.descendants_of(b.root()));
        ours.zip(theirs).all(|(x, y)| {
            a.tag_of(x) == b.tag_of(y)
                && a.child_count(x) == b.child_count(y)
                && a.attributes_of(x).eq(b.attributes_of(y))
        })
    }

    /// Pretty JSON dump of the format name and tree.
    pub fn to_json(&self) -> Result<String, CoreError> {
        let dump = DocumentDump {
            format: &self.format_name,
            labels: self.snapshot(),
        };
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("format_name", &self.format_name)
            .field("labels", &self.tree.len())
            .finish()
    }
}

#[derive(Serialize)]
struct DocumentDump<'a> {
    format: &'a str,
    labels: Vec<LabelSnapshot>,
}

// ==============================================================================
// Structural Snapshot
// ==============================================================================

/// One label of a flattened tree, detached from any tree. A pre-order
/// sequence of these describes the whole shape: each label is followed by
/// the subtrees of its `child_count` children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSnapshot {
    pub depth: usize,
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub child_count: usize,
}

impl LabelSnapshot {
    /// Flatten the subtree rooted at `label` in pre-order. Depths are
    /// relative to `label`.
    pub fn collect(tree: &LabelTree, label: LabelId) -> Vec<LabelSnapshot> {
        let mut out = Vec::new();
        let mut stack = vec![(label, 0usize)];
        while let Some((current, depth)) = stack.pop() {
            out.push(LabelSnapshot {
                depth,
                tag: tree.tag_of(current),
                attributes: tree.attributes_of(current).cloned().collect(),
                child_count: tree.child_count(current),
            });
            stack.extend(tree.children_of(current).rev().map(|child| (child, depth + 1)));
        }
        out
    }
}
