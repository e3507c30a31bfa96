//! Rendering: field-registry walk producing the final JSON tree.
//!
//! Strictly the second phase of the pipeline. The context is read-only
//! here; every preload this render depends on has already resolved.

pub mod page;

use crate::{
    MAX_RENDER_DEPTH,
    context::RenderContext,
    entity::{Entity, Related},
    error::RenderError,
    schema::{AssociationSpec, FieldSpec, Registry, ResourceSchema},
    types::{Cardinality, FieldKind, ResourceKind, View, WireType},
};
use serde_json::{Map, Value};
use std::sync::Arc;

///
/// Computed
///
/// Result of a compute function. `Skip` is the explicit
/// early-return-without-value path: the field falls through to its
/// default/nullable handling instead of emitting a computed value.
///

#[derive(Clone, Debug)]
pub enum Computed {
    Value(Value),
    Skip,
}

impl Computed {
    /// Wrap any JSON-serializable value.
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }
}

impl<T: Into<Value>> From<T> for Computed {
    fn from(value: T) -> Self {
        Self::Value(value.into())
    }
}

///
/// Renderer
///

pub struct Renderer<'a> {
    registry: &'a Registry,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Render one entity against its resource schema.
    pub fn render(
        &self,
        entity: &Arc<dyn Entity>,
        kind: ResourceKind,
        ctx: &RenderContext,
        view: View,
    ) -> Result<Value, RenderError> {
        self.render_at_depth(entity, kind, ctx, view, 0)
    }

    /// Render a homogeneous collection, preserving input order.
    pub fn render_many(
        &self,
        entities: &[Arc<dyn Entity>],
        kind: ResourceKind,
        ctx: &RenderContext,
        view: View,
    ) -> Result<Value, RenderError> {
        let rendered = entities
            .iter()
            .map(|entity| self.render_at_depth(entity, kind, ctx, view, 0))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Value::Array(rendered))
    }

    fn render_at_depth(
        &self,
        entity: &Arc<dyn Entity>,
        kind: ResourceKind,
        ctx: &RenderContext,
        view: View,
        depth: usize,
    ) -> Result<Value, RenderError> {
        ctx.check_deadline()?;
        if depth > MAX_RENDER_DEPTH {
            return Err(RenderError::DepthExceeded {
                resource: kind,
                max_depth: MAX_RENDER_DEPTH,
            });
        }

        let schema = self
            .registry
            .get(kind)
            .ok_or(RenderError::UnknownResource { kind })?;

        let mut out = Map::new();

        for field in schema.fields().iter() {
            if !schema.visible(field.view, view) {
                continue;
            }
            if let Some(value) = render_field(schema, field, entity.as_ref(), ctx)? {
                out.insert(field.wire_name.to_string(), value);
            }
        }

        for assoc in schema.associations().iter() {
            if !schema.visible(assoc.view, view) {
                continue;
            }
            let value = self.render_association(schema, assoc, entity, ctx, view, depth)?;
            out.insert(assoc.wire_name.to_string(), value);
        }

        Ok(Value::Object(out))
    }

    fn render_association(
        &self,
        schema: &ResourceSchema,
        assoc: &AssociationSpec,
        entity: &Arc<dyn Entity>,
        ctx: &RenderContext,
        view: View,
        depth: usize,
    ) -> Result<Value, RenderError> {
        let related = match &assoc.resolve {
            Some(resolve) => resolve(entity.as_ref(), ctx)?,
            None => entity
                .related(assoc.name)
                .ok_or(RenderError::UnknownAssociation {
                    resource: schema.kind(),
                    association: assoc.name,
                })?,
        };

        match (assoc.cardinality, related) {
            (Cardinality::Many, Related::Many(children)) => {
                let rendered = children
                    .iter()
                    .map(|child| {
                        self.render_at_depth(child, assoc.target, ctx, view, depth + 1)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(rendered))
            }
            (Cardinality::One | Cardinality::Opt, Related::One(child)) => {
                self.render_at_depth(&child, assoc.target, ctx, view, depth + 1)
            }
            (Cardinality::Opt, Related::None) => Ok(Value::Null),
            (Cardinality::One, Related::None) if assoc.nullable => Ok(Value::Null),
            (Cardinality::One, Related::None) => Err(RenderError::MissingRelated {
                resource: schema.kind(),
                association: assoc.name,
            }),
            (expected, _) => Err(RenderError::CardinalityMismatch {
                resource: schema.kind(),
                association: assoc.name,
                expected,
            }),
        }
    }
}

/// Resolve one field to its wire value, or `None` to omit the key.
fn render_field(
    schema: &ResourceSchema,
    field: &FieldSpec,
    entity: &dyn Entity,
    ctx: &RenderContext,
) -> Result<Option<Value>, RenderError> {
    let resolved = match &field.compute {
        Some(compute) => match compute(entity, ctx)? {
            Computed::Value(value) if !value.is_null() => Some(value),
            Computed::Value(_) | Computed::Skip => None,
        },
        None => entity.attribute(field.name).filter(|value| !value.is_null()),
    };

    let value = match resolved {
        Some(value) => {
            check_conformance(schema.kind(), field, &value)?;
            value
        }
        None => {
            if let Some(default) = &field.default {
                default.clone()
            } else if field.nullable {
                Value::Null
            } else if !field.required {
                return Ok(None);
            } else {
                // schema drift: surface loudly, never coerce to null
                return Err(RenderError::MissingValue {
                    resource: schema.kind(),
                    field: field.wire_name,
                });
            }
        }
    };

    Ok(Some(value))
}

fn check_conformance(
    resource: ResourceKind,
    field: &FieldSpec,
    value: &Value,
) -> Result<(), RenderError> {
    let mismatch = |got: &Value| RenderError::TypeMismatch {
        resource,
        field: field.wire_name,
        expected: field.kind,
        got: json_type_name(got),
    };

    match field.kind {
        FieldKind::Scalar(wire) => {
            if !scalar_matches(wire, value) {
                return Err(mismatch(value));
            }
            check_enum(resource, field, value)?;
        }
        FieldKind::Array(wire) => {
            let Some(items) = value.as_array() else {
                return Err(mismatch(value));
            };
            for item in items {
                if !scalar_matches(wire, item) {
                    return Err(mismatch(item));
                }
                check_enum(resource, field, item)?;
            }
        }
        FieldKind::Object => {
            if !value.is_object() {
                return Err(mismatch(value));
            }
        }
    }

    Ok(())
}

fn check_enum(
    resource: ResourceKind,
    field: &FieldSpec,
    value: &Value,
) -> Result<(), RenderError> {
    let (Some(allowed), Some(text)) = (field.enum_values, value.as_str()) else {
        return Ok(());
    };

    if allowed.contains(&text) {
        Ok(())
    } else {
        Err(RenderError::EnumViolation {
            resource,
            field: field.wire_name,
            value: text.to_string(),
        })
    }
}

fn scalar_matches(wire: WireType, value: &Value) -> bool {
    match wire {
        WireType::Bool => value.is_boolean(),
        WireType::Int => value.is_i64() || value.is_u64(),
        WireType::Float => value.is_number(),
        WireType::String => value.is_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
