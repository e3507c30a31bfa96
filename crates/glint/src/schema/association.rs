use crate::{
    context::RenderContext,
    entity::{Entity, Related},
    error::RenderError,
    types::{Cardinality, ResourceKind},
};
use std::sync::Arc;

///
/// ResolveFn
///
/// Custom association resolution. An association resolved through a
/// function is opaque to the preload planner: its subtree contributes no
/// ids to any batch, matching the skip-over-associations-with-blocks rule.
///

pub type ResolveFn =
    Arc<dyn Fn(&dyn Entity, &RenderContext) -> Result<Related, RenderError> + Send + Sync>;

///
/// AssociationSpec
///

#[derive(Clone)]
pub struct AssociationSpec {
    pub name: &'static str,
    pub wire_name: &'static str,
    pub target: ResourceKind,
    pub cardinality: Cardinality,
    pub nullable: bool,
    pub view: Option<&'static str>,
    pub resolve: Option<ResolveFn>,
}

impl AssociationSpec {
    #[must_use]
    pub const fn new(name: &'static str, target: ResourceKind, cardinality: Cardinality) -> Self {
        Self {
            name,
            wire_name: name,
            target,
            cardinality,
            nullable: false,
            view: None,
            resolve: None,
        }
    }

    #[must_use]
    pub const fn one(name: &'static str, target: ResourceKind) -> Self {
        Self::new(name, target, Cardinality::One)
    }

    #[must_use]
    pub const fn opt(name: &'static str, target: ResourceKind) -> Self {
        Self::new(name, target, Cardinality::Opt)
    }

    #[must_use]
    pub const fn many(name: &'static str, target: ResourceKind) -> Self {
        Self::new(name, target, Cardinality::Many)
    }

    #[must_use]
    pub const fn wire(mut self, wire_name: &'static str) -> Self {
        self.wire_name = wire_name;
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn view(mut self, tag: &'static str) -> Self {
        self.view = Some(tag);
        self
    }

    /// Resolve through a function instead of `Entity::related`. Excluded
    /// from preload planning.
    #[must_use]
    pub fn resolved_with(
        mut self,
        resolve: impl Fn(&dyn Entity, &RenderContext) -> Result<Related, RenderError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.resolve = Some(Arc::new(resolve));
        self
    }
}

impl std::fmt::Debug for AssociationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociationSpec")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("target", &self.target)
            .field("cardinality", &self.cardinality)
            .field("nullable", &self.nullable)
            .field("view", &self.view)
            .field("resolved_with_fn", &self.resolve.is_some())
            .finish()
    }
}

///
/// AssociationList
///
/// Same last-write-wins insertion contract as `FieldList`.
///

#[derive(Clone, Debug, Default)]
pub struct AssociationList {
    associations: Vec<AssociationSpec>,
}

impl AssociationList {
    pub fn insert(&mut self, spec: AssociationSpec) {
        match self
            .associations
            .iter_mut()
            .find(|a| a.wire_name == spec.wire_name)
        {
            Some(slot) => *slot = spec,
            None => self.associations.push(spec),
        }
    }

    #[must_use]
    pub fn get(&self, wire_name: &str) -> Option<&AssociationSpec> {
        self.associations.iter().find(|a| a.wire_name == wire_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssociationSpec> {
        self.associations.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }
}
