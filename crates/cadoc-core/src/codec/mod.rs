//! Binary persistence for documents.
//!
//! [`BinaryCodec`] turns a [`Document`] into a self-checking container and
//! back. Encoding is deterministic; decoding either yields a complete,
//! validated document or an error, never a partially built one.

mod format;
mod reader;
mod varint;
mod writer;

pub use format::{MAGIC, VERSION};

use std::collections::BTreeSet;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::CoreError;
use crate::types::DecodeLimits;

/// Format name recognized by a default codec.
pub const DEFAULT_FORMAT: &str = "BinCaf";

/// Serializable codec settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub formats: Vec<String>,
    pub limits: DecodeLimits,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            formats: vec![DEFAULT_FORMAT.to_string()],
            limits: DecodeLimits::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinaryCodec {
    formats: BTreeSet<String>,
    limits: DecodeLimits,
}

impl Default for BinaryCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryCodec {
    pub fn new() -> Self {
        Self::from_config(CodecConfig::default())
    }

    /// A codec that recognizes no format until one is defined.
    pub fn empty() -> Self {
        Self {
            formats: BTreeSet::new(),
            limits: DecodeLimits::default(),
        }
    }

    pub fn from_config(config: CodecConfig) -> Self {
        Self {
            formats: config.formats.into_iter().collect(),
            limits: config.limits,
        }
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Register a format name. Returns `false` if it was already known.
    pub fn define_format(&mut self, name: impl Into<String>) -> bool {
        self.formats.insert(name.into())
    }

    pub fn recognizes(&self, format_name: &str) -> bool {
        self.formats.contains(format_name)
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.formats.iter().map(String::as_str)
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    // ========================================================================
    // In-memory encode / decode
    // ========================================================================

    /// Encode `doc`. Fails with `FormatMismatch` for an unrecognized format
    /// and with `LimitExceeded` for a document this codec could not decode.
    pub fn encode(&self, doc: &Document) -> Result<Vec<u8>, CoreError> {
        if !self.recognizes(doc.format_name()) {
            return Err(CoreError::FormatMismatch(doc.format_name().to_string()));
        }
        writer::write_document(doc, &self.limits)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Document, CoreError> {
        reader::read_document(bytes, |name| self.recognizes(name), &self.limits).inspect_err(
            |e| tracing::warn!(error = %e, bytes = bytes.len(), "rejected document container"),
        )
    }

    // ========================================================================
    // Streams
    // ========================================================================

    /// Encode `doc` fully, then write it to `sink` in one pass.
    pub fn save<W: Write>(&self, doc: &Document, sink: &mut W) -> Result<(), CoreError> {
        let bytes = self.encode(doc)?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    /// Read `source` to completion, then decode.
    pub fn load<R: Read>(&self, source: &mut R) -> Result<Document, CoreError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        self.decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{Attribute, AttributeId};
    use crate::test_util::{deep_document, sample_document, TEST_FORMAT};

    fn codec() -> BinaryCodec {
        BinaryCodec::new()
    }

    fn assert_corrupt(result: Result<Document, CoreError>) {
        match result {
            Err(CoreError::CorruptData { .. }) => {}
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    /// Re-seal a hand-edited container body with a valid checksum.
    fn reseal(mut body: Vec<u8>) -> Vec<u8> {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(&body);
        body.extend_from_slice(&digest);
        body
    }

    fn body_of(bytes: &[u8]) -> Vec<u8> {
        bytes[..bytes.len() - format::HASH_LEN].to_vec()
    }

    #[test]
    fn empty_document_layout() {
        let doc = Document::create(TEST_FORMAT);
        let bytes = codec().encode(&doc).expect("encode");

        let mut expected = Vec::new();
        expected.extend_from_slice(b"CDOC");
        expected.push(VERSION);
        expected.push(TEST_FORMAT.len() as u8);
        expected.extend_from_slice(TEST_FORMAT.as_bytes());
        expected.extend_from_slice(&[1, 0, 0, 0]); // one label: tag 0, no attrs, no children
        assert_eq!(body_of(&bytes), expected);
    }

    #[test]
    fn round_trip_preserves_structure() {
        let doc = sample_document();
        let bytes = codec().encode(&doc).expect("encode");
        let loaded = codec().decode(&bytes).expect("decode");

        assert!(loaded.is_structurally_equal(&doc));
        assert_eq!(loaded.tree().len(), doc.tree().len());

        let tree = loaded.tree();
        let top = tree
            .find_label(&"0:1:27".parse().expect("entry"))
            .expect("0:1:27 survives");
        assert_eq!(tree.name_of(top), Some("Top"));
    }

    #[test]
    fn encoding_is_deterministic() {
        let first = codec().encode(&sample_document()).expect("first");
        let second = codec().encode(&sample_document()).expect("second");
        assert_eq!(first, second);

        let reloaded = codec().decode(&first).expect("decode");
        assert_eq!(codec().encode(&reloaded).expect("re-encode"), first);
    }

    #[test]
    fn stream_save_and_load() {
        let doc = sample_document();
        let mut sink = Vec::new();
        codec().save(&doc, &mut sink).expect("save");
        let loaded = codec().load(&mut sink.as_slice()).expect("load");
        assert!(loaded.is_structurally_equal(&doc));
    }

    #[test]
    fn unrecognized_format_fails_both_ways() {
        let doc = Document::create("XmlCaf");
        assert!(matches!(
            codec().encode(&doc),
            Err(CoreError::FormatMismatch(name)) if name == "XmlCaf"
        ));

        let mut permissive = BinaryCodec::empty();
        assert!(permissive.define_format("XmlCaf"));
        assert!(!permissive.define_format("XmlCaf"));
        let bytes = permissive.encode(&doc).expect("encode with permissive codec");

        assert!(matches!(
            codec().decode(&bytes),
            Err(CoreError::FormatMismatch(name)) if name == "XmlCaf"
        ));
    }

    #[test]
    fn every_truncation_is_corrupt() {
        let bytes = codec().encode(&sample_document()).expect("encode");
        for len in 0..bytes.len() {
            assert_corrupt(codec().decode(&bytes[..len]));
        }
    }

    #[test]
    fn every_flipped_byte_is_corrupt() {
        let bytes = codec().encode(&sample_document()).expect("encode");
        for i in 0..bytes.len() {
            let mut damaged = bytes.clone();
            damaged[i] ^= 0x01;
            assert_corrupt(codec().decode(&damaged));
        }
    }

    #[test]
    fn trailing_bytes_are_corrupt() {
        let bytes = codec().encode(&Document::create(TEST_FORMAT)).expect("encode");
        let mut body = body_of(&bytes);
        body.push(0);
        assert_corrupt(codec().decode(&reseal(body)));
    }

    #[test]
    fn duplicate_sibling_tags_are_corrupt() {
        let mut body = Vec::new();
        body.extend_from_slice(b"CDOC");
        body.push(VERSION);
        body.push(TEST_FORMAT.len() as u8);
        body.extend_from_slice(TEST_FORMAT.as_bytes());
        // 3 labels: root with two children both tagged 4.
        body.extend_from_slice(&[3, 0, 0, 2, 4, 0, 0, 4, 0, 0]);
        match codec().decode(&reseal(body)) {
            Err(CoreError::CorruptData { message, .. }) => assert!(message.contains("tag 4")),
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    #[test]
    fn unknown_attribute_type_is_corrupt() {
        let mut body = Vec::new();
        body.extend_from_slice(b"CDOC");
        body.push(VERSION);
        body.push(TEST_FORMAT.len() as u8);
        body.extend_from_slice(TEST_FORMAT.as_bytes());
        body.extend_from_slice(&[1, 0, 1]);
        body.extend_from_slice(&[0x11; 16]);
        body.extend_from_slice(&[0, 0]);
        assert_corrupt(codec().decode(&reseal(body)));
    }

    #[test]
    fn declared_label_count_must_match() {
        let bytes = codec().encode(&Document::create(TEST_FORMAT)).expect("encode");
        let mut body = body_of(&bytes);
        let count_at = format::HEADER_LEN + 1 + TEST_FORMAT.len();
        body[count_at] = 2;
        assert_corrupt(codec().decode(&reseal(body)));
    }

    #[test]
    fn limits_bound_label_count_and_depth() {
        let (doc, _) = deep_document(16);
        let bytes = codec().encode(&doc).expect("encode");

        let shallow = codec().with_limits(DecodeLimits {
            max_depth: 8,
            ..DecodeLimits::default()
        });
        assert_corrupt(shallow.decode(&bytes));

        let small = codec().with_limits(DecodeLimits {
            max_labels: 4,
            ..DecodeLimits::default()
        });
        assert_corrupt(small.decode(&bytes));

        assert!(codec().decode(&bytes).is_ok());
    }

    #[test]
    fn encode_refuses_documents_its_decoder_would_reject() {
        let (deep, _) = deep_document(DecodeLimits::default().max_depth + 1);
        assert!(matches!(
            codec().encode(&deep),
            Err(CoreError::LimitExceeded(message)) if message.contains("depth")
        ));

        let (at_limit, _) = deep_document(DecodeLimits::default().max_depth);
        let bytes = codec().encode(&at_limit).expect("depth at the limit");
        assert!(codec().decode(&bytes).is_ok());

        let tight = codec().with_limits(DecodeLimits {
            max_labels: 3,
            max_attributes_per_label: 1,
            max_string_len: TEST_FORMAT.len(),
            ..DecodeLimits::default()
        });
        let mut doc = Document::create(TEST_FORMAT);
        let main = doc.main_label().expect("main");
        doc.tree_mut().set_name(main, "long name");
        assert!(matches!(tight.encode(&doc), Err(CoreError::LimitExceeded(_))));

        doc.tree_mut().set_name(main, "ok");
        doc.tree_mut().add_attribute(main, Attribute::Integer(1));
        assert!(matches!(tight.encode(&doc), Err(CoreError::LimitExceeded(_))));

        doc.tree_mut()
            .forget_attribute(main, AttributeId::INTEGER)
            .expect("forget");
        let bytes = tight.encode(&doc).expect("within limits");
        assert!(tight.decode(&bytes).expect("decode").is_structurally_equal(&doc));

        doc.tree_mut().new_child(main).expect("0:1:1");
        doc.tree_mut().new_child(main).expect("0:1:2");
        assert!(matches!(tight.encode(&doc), Err(CoreError::LimitExceeded(_))));

        let mut sink = Vec::new();
        assert!(tight.save(&doc, &mut sink).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let deep = codec().with_limits(DecodeLimits {
            max_depth: 100_000,
            ..DecodeLimits::default()
        });
        let (doc, leaf) = deep_document(50_000);
        let bytes = deep.encode(&doc).expect("encode");
        let loaded = deep.decode(&bytes).expect("decode");
        assert_eq!(loaded.tree().len(), 50_001);
        assert!(loaded.is_structurally_equal(&doc));
        let entry = doc.tree().entry_of(leaf);
        let reloaded_leaf = loaded.tree().find_label(&entry).expect("leaf survives");
        assert_eq!(loaded.tree().depth_of(reloaded_leaf), 50_000);
    }

    #[test]
    fn overlong_varint_is_corrupt_not_a_panic() {
        let mut body = Vec::new();
        body.extend_from_slice(b"CDOC");
        body.push(VERSION);
        // Format name length with a continuation bit on its tenth byte.
        body.extend_from_slice(&[0x80; 10]);
        body.push(0x00);
        match codec().decode(&reseal(body)) {
            Err(CoreError::CorruptData { offset, message }) => {
                assert_eq!(offset, format::HEADER_LEN);
                assert!(message.contains("overflow"));
            }
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    #[test]
    fn extreme_attribute_values_survive() {
        let mut doc = Document::create(TEST_FORMAT);
        let main = doc.main_label().expect("main");
        let other = doc.tree_mut().new_child(main).expect("child");
        let tree = doc.tree_mut();
        tree.add_attribute(main, Attribute::Integer(i64::MIN));
        tree.add_attribute(main, Attribute::Real(f64::NAN));
        tree.add_attribute(other, Attribute::Integer(i64::MAX));
        tree.set_name(other, "ünïcødé ✓");

        let loaded = codec()
            .decode(&codec().encode(&doc).expect("encode"))
            .expect("decode");
        assert!(loaded.is_structurally_equal(&doc));
        let main = loaded.tree().child(loaded.root(), 1).expect("main");
        assert_eq!(
            loaded
                .tree()
                .find_attribute(main, AttributeId::INTEGER)
                .expect("integer")
                .as_integer(),
            Some(i64::MIN)
        );
    }

    #[test]
    fn codec_config_round_trips_through_json() {
        let config: CodecConfig =
            serde_json::from_str(r#"{"formats": ["BinCaf", "BinXCaf"]}"#).expect("config");
        let codec = BinaryCodec::from_config(config);
        assert!(codec.recognizes("BinXCaf"));
        assert_eq!(codec.formats().collect::<Vec<_>>(), ["BinCaf", "BinXCaf"]);
        assert_eq!(codec.limits(), &DecodeLimits::default());
    }
}
