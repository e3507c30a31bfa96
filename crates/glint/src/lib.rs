//! glint — schema-first JSON view rendering with batched preloads.
//!
//! ## Crate layout
//! - `schema`: declarative field registry, views, and the startup-time
//!   registry builder.
//! - `entity`: the domain-object boundary trait and a map-backed record.
//! - `context`: per-request viewer/organization state and the preloaded
//!   value bag.
//! - `preload`: single-pass batch planning and execution.
//! - `render`: the per-entity registry walk, plus the paged envelope.
//! - `cursor`: the opaque page-cursor token codec.
//! - `obs`: pipeline counters and the event-sink boundary.
//!
//! The `prelude` module mirrors the surface a typical caller needs.

pub mod context;
pub mod cursor;
pub mod entity;
pub mod error;
pub mod obs;
pub mod pipeline;
pub mod preload;
pub mod render;
pub mod schema;
pub mod types;

use thiserror::Error as ThisError;

/// Maximum length for resource kind names.
pub const MAX_RESOURCE_NAME_LEN: usize = 64;

/// Maximum length for field, association, and view identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

/// Maximum association recursion depth during rendering. Self-referential
/// schemas are bounded by actual data depth; this cap turns cyclic data
/// into an error instead of a hang.
pub const MAX_RENDER_DEPTH: usize = 64;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] schema::BuildError),

    #[error(transparent)]
    Render(#[from] error::RenderError),
}

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        context::{Organization, RenderContext, UrlBuilder, Viewer},
        entity::{Entity, Record, Related},
        error::RenderError,
        pipeline::Pipeline,
        preload::{Coordinator, PreloadMap, PreloadPlan, Preloader},
        render::{
            Computed, Renderer,
            page::{PageRequest, PageSpec},
        },
        schema::{
            AssociationSpec, FieldSpec, Registry, RegistryBuilder, ResourceSchema, ViewDef,
        },
        types::{Cardinality, EntityId, FieldKind, ResourceKind, View, WireType},
    };
}
