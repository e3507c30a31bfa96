//! Field registry: declarative, per-resource output schemas.
//!
//! Schemas are built once at process start through `RegistryBuilder` and
//! are immutable afterwards. There is no lazy-init global table; callers
//! own the `Registry` and pass it by reference.

pub mod association;
pub mod build;
pub mod field;
pub mod resource;
pub mod view;

pub use association::{AssociationList, AssociationSpec, ResolveFn};
pub use build::{BuildError, Registry, RegistryBuilder};
pub use field::{ComputeFn, FieldList, FieldSpec};
pub use resource::ResourceSchema;
pub use view::ViewDef;
