//! `Application` — creates documents and moves them in and out of storage.
//!
//! The application owns the binary codec (and so the set of defined formats)
//! and the storage backend. It is passed explicitly; there is no global
//! instance.

use std::path::Path;

use crate::codec::{BinaryCodec, CodecConfig};
use crate::document::Document;
use crate::error::CoreError;
use crate::storage::ContainerStorage;
use crate::types::DecodeLimits;

pub struct Application<S> {
    codec: BinaryCodec,
    storage: S,
}

impl<S: ContainerStorage> Application<S> {
    /// An application with no formats defined yet.
    pub fn new(storage: S) -> Self {
        Self {
            codec: BinaryCodec::empty(),
            storage,
        }
    }

    pub fn with_config(storage: S, config: CodecConfig) -> Self {
        Self {
            codec: BinaryCodec::from_config(config),
            storage,
        }
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.codec = self.codec.with_limits(limits);
        self
    }

    /// Make `format_name` available for new documents, saving and opening.
    pub fn define_format(&mut self, format_name: impl Into<String>) {
        let format_name = format_name.into();
        if self.codec.define_format(format_name.clone()) {
            tracing::debug!(format = %format_name, "format defined");
        }
    }

    pub fn codec(&self) -> &BinaryCodec {
        &self.codec
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Create an empty document in a defined format.
    pub fn new_document(&self, format_name: &str) -> Result<Document, CoreError> {
        if !self.codec.recognizes(format_name) {
            return Err(CoreError::FormatMismatch(format_name.to_string()));
        }
        Ok(Document::create(format_name))
    }

    /// Encode `doc` and store it at `path` with a single write.
    pub fn save_as(&self, doc: &Document, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        let bytes = self.codec.encode(doc)?;
        self.storage.write_bytes(path, &bytes)?;
        tracing::info!(
            path = %path.display(),
            format = doc.format_name(),
            labels = doc.tree().len(),
            bytes = bytes.len(),
            "document saved"
        );
        Ok(())
    }

    /// Read and decode the container at `path` into a fresh document.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Document, CoreError> {
        let path = path.as_ref();
        let bytes = self.storage.read_bytes(path)?;
        let doc = self.codec.decode(&bytes)?;
        tracing::info!(
            path = %path.display(),
            format = doc.format_name(),
            labels = doc.tree().len(),
            "document opened"
        );
        Ok(doc)
    }
}
