mod validate;

use crate::{
    schema::resource::ResourceSchema,
    types::ResourceKind,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;
use validate::{validate_ident, validate_resource_name};

///
/// BuildError
///
/// Schema construction failures. All of these are fatal at startup; a
/// registry that builds is closed over its association targets and views.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum BuildError {
    #[error("resource '{kind}' is registered twice")]
    DuplicateResource { kind: ResourceKind },

    #[error("{resource}: view '{view}' is declared twice")]
    DuplicateView {
        resource: ResourceKind,
        view: &'static str,
    },

    #[error("{resource}.{field}: default {value:?} violates the field contract: {reason}")]
    InvalidDefault {
        resource: ResourceKind,
        field: &'static str,
        value: Value,
        reason: String,
    },

    #[error("{resource}: invalid identifier: {reason}")]
    InvalidIdent {
        resource: ResourceKind,
        reason: String,
    },

    #[error("{resource}: {reason}")]
    InvalidResourceName {
        resource: ResourceKind,
        reason: String,
    },

    #[error("{resource}.{association}: target resource '{target}' has no schema")]
    UnknownAssociationTarget {
        resource: ResourceKind,
        association: &'static str,
        target: ResourceKind,
    },

    #[error("{resource}: view '{view}' includes undeclared view '{include}'")]
    UnknownViewInclude {
        resource: ResourceKind,
        view: &'static str,
        include: &'static str,
    },

    #[error("{resource}: wire name '{wire_name}' is used by both a field and an association")]
    WireNameCollision {
        resource: ResourceKind,
        wire_name: &'static str,
    },
}

///
/// RegistryBuilder
///
/// Explicit startup-time construction. Collect every resource schema, then
/// `build` validates the whole table as a closed graph and freezes it.
/// Self-referential associations (comment → replies → comment) are legal.
///

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    resources: Vec<ResourceSchema>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn resource(mut self, schema: ResourceSchema) -> Self {
        self.resources.push(schema);
        self
    }

    pub fn build(self) -> Result<Registry, BuildError> {
        let kinds: BTreeSet<ResourceKind> =
            self.resources.iter().map(ResourceSchema::kind).collect();

        let mut resources = BTreeMap::new();
        for schema in self.resources {
            let kind = schema.kind();
            validate_schema(&schema, &kinds)?;
            if resources.insert(kind, schema).is_some() {
                return Err(BuildError::DuplicateResource { kind });
            }
        }

        Ok(Registry { resources })
    }
}

fn validate_schema(
    schema: &ResourceSchema,
    kinds: &BTreeSet<ResourceKind>,
) -> Result<(), BuildError> {
    let resource = schema.kind();

    validate_resource_name(resource.as_str()).map_err(|reason| {
        BuildError::InvalidResourceName { resource, reason }
    })?;

    let mut wire_names = BTreeSet::new();
    for field in schema.fields().iter() {
        validate_ident(field.name)
            .and_then(|()| validate_ident(field.wire_name))
            .map_err(|reason| BuildError::InvalidIdent { resource, reason })?;
        wire_names.insert(field.wire_name);

        validate_default(schema, field)?;
    }

    for assoc in schema.associations().iter() {
        validate_ident(assoc.name)
            .and_then(|()| validate_ident(assoc.wire_name))
            .map_err(|reason| BuildError::InvalidIdent { resource, reason })?;

        if wire_names.contains(assoc.wire_name) {
            return Err(BuildError::WireNameCollision {
                resource,
                wire_name: assoc.wire_name,
            });
        }
        if !kinds.contains(&assoc.target) {
            return Err(BuildError::UnknownAssociationTarget {
                resource,
                association: assoc.name,
                target: assoc.target,
            });
        }
    }

    let mut view_names = BTreeSet::new();
    for view in schema.views() {
        validate_ident(view.name)
            .map_err(|reason| BuildError::InvalidIdent { resource, reason })?;
        if !view_names.insert(view.name) {
            return Err(BuildError::DuplicateView {
                resource,
                view: view.name,
            });
        }
    }
    for view in schema.views() {
        for include in view.includes {
            if !view_names.contains(include) {
                return Err(BuildError::UnknownViewInclude {
                    resource,
                    view: view.name,
                    include,
                });
            }
        }
    }

    Ok(())
}

fn validate_default(
    schema: &ResourceSchema,
    field: &crate::schema::field::FieldSpec,
) -> Result<(), BuildError> {
    let Some(default) = &field.default else {
        return Ok(());
    };

    if default.is_null() {
        return Err(BuildError::InvalidDefault {
            resource: schema.kind(),
            field: field.wire_name,
            value: default.clone(),
            reason: "defaults must carry a value; use `nullable` for null".to_string(),
        });
    }

    if let (Some(allowed), Some(text)) = (field.enum_values, default.as_str()) {
        if !allowed.contains(&text) {
            return Err(BuildError::InvalidDefault {
                resource: schema.kind(),
                field: field.wire_name,
                value: default.clone(),
                reason: format!("not a member of {allowed:?}"),
            });
        }
    }

    Ok(())
}

///
/// Registry
///
/// The frozen schema table. Passed by reference through the coordinator
/// and renderer; never mutated after `build`.
///

#[derive(Debug)]
pub struct Registry {
    resources: BTreeMap<ResourceKind, ResourceSchema>,
}

impl Registry {
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> Option<&ResourceSchema> {
        self.resources.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.resources.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
