use crate::{
    context::RenderContext,
    entity::Entity,
    error::RenderError,
    render::Computed,
    types::{FieldKind, WireType},
};
use serde_json::Value;
use std::sync::Arc;

///
/// ComputeFn
///
/// Derived-field computation. Runs only after every planned preload has
/// resolved into the context. Returning `Computed::Skip` is the explicit
/// early-return-without-value path; it falls through to the field's
/// default/nullable handling.
///

pub type ComputeFn =
    Arc<dyn Fn(&dyn Entity, &RenderContext) -> Result<Computed, RenderError> + Send + Sync>;

///
/// FieldSpec
///
/// Immutable once the owning registry is built.
///

#[derive(Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub wire_name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    pub required: bool,
    pub default: Option<Value>,
    pub enum_values: Option<&'static [&'static str]>,
    pub view: Option<&'static str>,
    pub compute: Option<ComputeFn>,
}

impl FieldSpec {
    /// Passthrough field reading the attribute named `name`.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire_name: name,
            kind,
            nullable: false,
            required: true,
            default: None,
            enum_values: None,
            view: None,
            compute: None,
        }
    }

    /// Scalar passthrough shorthand.
    #[must_use]
    pub const fn scalar(name: &'static str, wire: WireType) -> Self {
        Self::new(name, FieldKind::Scalar(wire))
    }

    /// Computed field deriving its value from the entity and context.
    #[must_use]
    pub fn computed(
        name: &'static str,
        kind: FieldKind,
        compute: impl Fn(&dyn Entity, &RenderContext) -> Result<Computed, RenderError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        let mut spec = Self::new(name, kind);
        spec.compute = Some(Arc::new(compute));
        spec
    }

    /// Emit under a different wire name than the accessor name.
    #[must_use]
    pub const fn wire(mut self, wire_name: &'static str) -> Self {
        self.wire_name = wire_name;
        self
    }

    /// Allow the field to serialize as `null`.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Allow the field key to be absent from the output object.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Value emitted when the field resolves to no value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restrict string values to a closed vocabulary.
    #[must_use]
    pub const fn enums(mut self, values: &'static [&'static str]) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Only include the field when rendering under this view (or a view
    /// that includes it).
    #[must_use]
    pub const fn view(mut self, tag: &'static str) -> Self {
        self.view = Some(tag);
        self
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("view", &self.view)
            .field("computed", &self.compute.is_some())
            .finish()
    }
}

///
/// FieldList
///
/// Ordered field table for one resource. Insertion is last-write-wins by
/// wire name: re-registering a wire name replaces the earlier spec in
/// place, keeping its position. Deliberate, used for deprecation aliases
/// that re-point an existing wire name at a new accessor.
///

#[derive(Clone, Debug, Default)]
pub struct FieldList {
    fields: Vec<FieldSpec>,
}

impl FieldList {
    pub fn insert(&mut self, spec: FieldSpec) {
        match self.fields.iter_mut().find(|f| f.wire_name == spec.wire_name) {
            Some(slot) => *slot = spec,
            None => self.fields.push(spec),
        }
    }

    #[must_use]
    pub fn get(&self, wire_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_last_write_wins_by_wire_name() {
        let mut list = FieldList::default();
        list.insert(FieldSpec::scalar("expiration_setting", WireType::String));
        list.insert(FieldSpec::scalar("title", WireType::String));
        list.insert(
            FieldSpec::scalar("expiration", WireType::String).wire("expiration_setting"),
        );

        assert_eq!(list.len(), 2);
        // the override keeps the original position but re-points the accessor
        let first = list.iter().next().unwrap();
        assert_eq!(first.wire_name, "expiration_setting");
        assert_eq!(first.name, "expiration");
    }

    #[test]
    fn get_resolves_by_wire_name_not_accessor_name() {
        let mut list = FieldList::default();
        list.insert(FieldSpec::scalar("created_at", WireType::String).wire("createdAt"));

        assert!(list.get("createdAt").is_some());
        assert!(list.get("created_at").is_none());
    }
}
