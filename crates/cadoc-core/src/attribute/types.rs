//! Attribute kinds, their GUID identities, and the attribute value enum.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// Attribute Identity
// ==============================================================================

/// Globally unique identity of an attribute kind.
///
/// The set of attributes on a label is keyed by this id, so at most one
/// attribute of each kind can be attached to a label at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(Uuid);

impl AttributeId {
    pub const INTEGER: Self = Self(Uuid::from_u128(0x2a96b606_ec8b_11d0_bee7_080009dc3333));
    pub const REAL: Self = Self(Uuid::from_u128(0x2a96b60f_ec8b_11d0_bee7_080009dc3333));
    pub const NAME: Self = Self(Uuid::from_u128(0x2a96b608_ec8b_11d0_bee7_080009dc3333));

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

// ==============================================================================
// Attribute Kinds
// ==============================================================================

/// The closed set of attribute kinds this engine knows how to store and
/// persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Integer,
    Real,
    Name,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 3] = [Self::Integer, Self::Real, Self::Name];

    pub fn id(self) -> AttributeId {
        match self {
            Self::Integer => AttributeId::INTEGER,
            Self::Real => AttributeId::REAL,
            Self::Name => AttributeId::NAME,
        }
    }

    /// Map a type id back to its kind. Returns `None` for ids this engine
    /// does not define.
    pub fn from_id(id: AttributeId) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Real => write!(f, "real"),
            Self::Name => write!(f, "name"),
        }
    }
}

// ==============================================================================
// Attribute Values
// ==============================================================================

/// A typed value attached to a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Attribute {
    Integer(i64),
    Real(f64),
    Name(String),
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Integer(_) => AttributeKind::Integer,
            Self::Real(_) => AttributeKind::Real,
            Self::Name(_) => AttributeKind::Name,
        }
    }

    pub fn id(&self) -> AttributeId {
        self.kind().id()
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(v) => Some(v),
            _ => None,
        }
    }
}

// Reals compare by bit pattern so that a reloaded NaN still equals the
// value that was saved.
impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::Name(a), Self::Name(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Attribute {}
