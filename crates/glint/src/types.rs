use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// ResourceKind
///
/// Schema identity for one resource type ("Post", "Comment"). Kinds are
/// static names; equality is by name.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ResourceKind(pub &'static str);

impl ResourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

///
/// EntityId
///
/// Numeric identity of a domain entity within its resource kind.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub struct EntityId(pub u64);

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

///
/// Cardinality
///

#[derive(
    Clone, Copy, Default, Debug, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
pub enum Cardinality {
    #[default]
    One,
    Opt,
    Many,
}

///
/// WireType
/// scalar value types that may appear on the wire
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, PartialEq, Serialize)]
#[remain::sorted]
pub enum WireType {
    Bool,
    Float,
    Int,
    String,
}

///
/// FieldKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum FieldKind {
    Array(WireType),
    Object,
    Scalar(WireType),
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Array(wire) => write!(f, "Array<{wire}>"),
            Self::Object => write!(f, "Object"),
            Self::Scalar(wire) => write!(f, "{wire}"),
        }
    }
}

///
/// View
///
/// Render-time selection of a named field subset. `Default` includes only
/// untagged fields; `Named` adds fields tagged with that view or any view
/// it transitively includes.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum View {
    #[default]
    Default,
    Named(&'static str),
}

impl View {
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Named(name) => Some(name),
        }
    }
}
