//! Shared fixtures for `cadoc-core` unit tests.

use crate::attribute::Attribute;
use crate::document::Document;
use crate::types::LabelId;

pub const TEST_FORMAT: &str = "BinCaf";

/// The label layout walked through by the framework tutorials:
///
/// ```text
/// 0
/// ├─ 0:1        main, Integer(199), Name("Main")
/// │  ├─ 0:1:1
/// │  ├─ 0:1:2
/// │  ├─ 0:1:3   Real(2.5)
/// │  │  └─ 0:1:3:1
/// │  └─ 0:1:27  Name("Top")
/// └─ 0:8
///    ├─ 0:8:2   Integer(-42)
///    └─ 0:8:7
/// ```
pub fn sample_document() -> Document {
    let mut doc = Document::create(TEST_FORMAT);
    let root = doc.root();
    let main = doc.main_label().expect("main label");
    let tree = doc.tree_mut();

    tree.add_attribute(main, Attribute::Integer(199));
    tree.set_name(main, "Main");

    tree.new_child(main).expect("0:1:1");
    tree.new_child(main).expect("0:1:2");
    let top = tree.find_child(main, 27, true).expect("0:1:27");
    tree.set_name(top, "Top");
    let level1 = tree.find_child(main, 3, true).expect("0:1:3");
    tree.add_attribute(level1, Attribute::Real(2.5));
    tree.find_child(level1, 1, true).expect("0:1:3:1");

    let lab1 = tree.find_child(root, 8, true).expect("0:8");
    tree.find_child(lab1, 7, true).expect("0:8:7");
    let lab3 = tree.find_child(lab1, 2, true).expect("0:8:2");
    tree.add_attribute(lab3, Attribute::Integer(-42));

    doc
}

/// A single chain of `depth` labels under the root.
pub fn deep_document(depth: usize) -> (Document, LabelId) {
    let mut doc = Document::create(TEST_FORMAT);
    let mut label = doc.root();
    for _ in 0..depth {
        label = doc.tree_mut().new_child(label).expect("chain link");
    }
    (doc, label)
}
