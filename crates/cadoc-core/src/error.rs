use crate::attribute::AttributeId;
use crate::types::Tag;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("label {0} is the root and has no father")]
    NoParent(String),

    #[error("unsupported document format `{0}`")]
    FormatMismatch(String),

    #[error("corrupt container at byte {offset}: {message}")]
    CorruptData { offset: usize, message: String },

    #[error("label {parent} already has a child with tag {tag}")]
    DuplicateTag { parent: String, tag: Tag },

    #[error("invalid tag {0}: child tags start at 1")]
    InvalidTag(u64),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("invalid entry `{0}`")]
    InvalidEntry(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn child_not_found(parent: &str, tag: Tag) -> Self {
        Self::NotFound(format!("child {tag} under label {parent}"))
    }

    pub(crate) fn attribute_not_found(label: &str, id: AttributeId) -> Self {
        Self::NotFound(format!("attribute {id} on label {label}"))
    }
}
