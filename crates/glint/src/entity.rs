use crate::types::{EntityId, ResourceKind};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

///
/// Entity
///
/// Boundary trait over domain objects. The pipeline never touches the data
/// store directly; attribute reads and association traversal go through
/// this seam.
///

pub trait Entity: Send + Sync {
    /// Resource kind whose schema describes this entity.
    fn kind(&self) -> ResourceKind;

    /// Identity within the resource kind.
    fn id(&self) -> EntityId;

    /// Read a named attribute, or `None` if the entity has no such value.
    fn attribute(&self, field: &str) -> Option<Value>;

    /// Traverse a named association, or `None` if the entity does not
    /// expose it at all (distinct from an association that is present but
    /// empty).
    fn related(&self, association: &str) -> Option<Related>;
}

///
/// Related
///
/// Result of traversing one association edge.
///

#[derive(Clone, Default)]
pub enum Related {
    #[default]
    None,
    One(Arc<dyn Entity>),
    Many(Vec<Arc<dyn Entity>>),
}

impl Related {
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Entities reachable through this edge, in traversal order.
    #[must_use]
    pub fn entities(&self) -> Vec<Arc<dyn Entity>> {
        match self {
            Self::None => Vec::new(),
            Self::One(entity) => vec![entity.clone()],
            Self::Many(entities) => entities.clone(),
        }
    }
}

impl std::fmt::Debug for Related {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "Related::None"),
            Self::One(entity) => write!(f, "Related::One({}#{})", entity.kind(), entity.id()),
            Self::Many(entities) => write!(f, "Related::Many(len={})", entities.len()),
        }
    }
}

///
/// Record
///
/// Map-backed `Entity` for loosely-typed rows and test fixtures. Attribute
/// and association maps are built up front; the record is immutable once
/// shared.
///

#[derive(Clone)]
pub struct Record {
    kind: ResourceKind,
    id: EntityId,
    attrs: BTreeMap<String, Value>,
    related: BTreeMap<String, Related>,
}

impl Record {
    #[must_use]
    pub fn new(kind: ResourceKind, id: impl Into<EntityId>) -> Self {
        Self {
            kind,
            id: id.into(),
            attrs: BTreeMap::new(),
            related: BTreeMap::new(),
        }
    }

    /// Set a named attribute value.
    #[must_use]
    pub fn attr(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(field.into(), value.into());
        self
    }

    /// Attach a single related entity.
    #[must_use]
    pub fn one(mut self, association: impl Into<String>, entity: Arc<dyn Entity>) -> Self {
        self.related.insert(association.into(), Related::One(entity));
        self
    }

    /// Declare an association that is present but empty.
    #[must_use]
    pub fn none(mut self, association: impl Into<String>) -> Self {
        self.related.insert(association.into(), Related::None);
        self
    }

    /// Attach a list of related entities.
    #[must_use]
    pub fn many(
        mut self,
        association: impl Into<String>,
        entities: Vec<Arc<dyn Entity>>,
    ) -> Self {
        self.related
            .insert(association.into(), Related::Many(entities));
        self
    }

    /// Finish building and hand out a shareable entity handle.
    #[must_use]
    pub fn shared(self) -> Arc<dyn Entity> {
        Arc::new(self)
    }
}

impl Entity for Record {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn attribute(&self, field: &str) -> Option<Value> {
        self.attrs.get(field).cloned()
    }

    fn related(&self, association: &str) -> Option<Related> {
        self.related.get(association).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOTE: ResourceKind = ResourceKind("Note");

    #[test]
    fn record_reads_back_attributes_and_associations() {
        let author = Record::new(NOTE, 7).attr("label", "author").shared();
        let record = Record::new(NOTE, 1)
            .attr("title", json!("hello"))
            .one("author", author)
            .none("replies");

        assert_eq!(record.attribute("title"), Some(json!("hello")));
        assert_eq!(record.attribute("missing"), None);
        assert!(matches!(record.related("author"), Some(Related::One(_))));
        assert!(matches!(record.related("replies"), Some(Related::None)));
        assert!(record.related("unknown").is_none());
    }

    #[test]
    fn related_entities_flattens_each_shape() {
        let a = Record::new(NOTE, 1).shared();
        let b = Record::new(NOTE, 2).shared();

        assert!(Related::None.entities().is_empty());
        assert_eq!(Related::One(a.clone()).entities().len(), 1);
        assert_eq!(Related::Many(vec![a, b]).entities().len(), 2);
    }
}
