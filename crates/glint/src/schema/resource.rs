use crate::{
    preload::Preloader,
    schema::{
        association::{AssociationList, AssociationSpec},
        field::{FieldList, FieldSpec},
        view::{self, ViewDef},
    },
    types::{ResourceKind, View},
};
use std::sync::Arc;

///
/// ResourceSchema
///
/// Declarative view-model for one resource kind: the exact output fields,
/// the association edges, the named views, and (optionally) the bulk-fetch
/// capability. Built once at startup, read-only thereafter.
///

#[derive(Clone)]
pub struct ResourceSchema {
    kind: ResourceKind,
    fields: FieldList,
    associations: AssociationList,
    views: Vec<ViewDef>,
    preloader: Option<Arc<dyn Preloader>>,
}

impl ResourceSchema {
    #[must_use]
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            fields: FieldList::default(),
            associations: AssociationList::default(),
            views: Vec::new(),
            preloader: None,
        }
    }

    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.insert(spec);
        self
    }

    #[must_use]
    pub fn association(mut self, spec: AssociationSpec) -> Self {
        self.associations.insert(spec);
        self
    }

    #[must_use]
    pub fn view(mut self, def: ViewDef) -> Self {
        self.views.push(def);
        self
    }

    /// Attach the bulk-fetch capability. A schema either has one or it does
    /// not; the planner checks capability presence, never reflection.
    #[must_use]
    pub fn preloader(mut self, preloader: Arc<dyn Preloader>) -> Self {
        self.preloader = Some(preloader);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldList {
        &self.fields
    }

    #[must_use]
    pub const fn associations(&self) -> &AssociationList {
        &self.associations
    }

    #[must_use]
    pub fn views(&self) -> &[ViewDef] {
        &self.views
    }

    #[must_use]
    pub fn preloadable(&self) -> Option<&Arc<dyn Preloader>> {
        self.preloader.as_ref()
    }

    /// Whether a field/association tagged `tag` is visible under `view`.
    /// Untagged entries are visible under every view.
    #[must_use]
    pub fn visible(&self, tag: Option<&'static str>, view: View) -> bool {
        match (tag, view) {
            (None, _) => true,
            (Some(_), View::Default) => false,
            (Some(tag), View::Named(name)) => view::expand(&self.views, name).contains(tag),
        }
    }
}

impl std::fmt::Debug for ResourceSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSchema")
            .field("kind", &self.kind)
            .field("fields", &self.fields)
            .field("associations", &self.associations)
            .field("views", &self.views)
            .field("preloadable", &self.preloader.is_some())
            .finish()
    }
}
