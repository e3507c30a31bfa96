//! Preload coordination: single-pass batched fetch planning and execution.
//!
//! Planning walks the association graph once, collecting one deduplicated
//! entity batch per resource kind that carries a `Preloader`. Execution
//! runs each batch exactly once and merges results into the context before
//! any field computation starts.

mod execute;
mod plan;

pub use plan::{PlanBatch, PreloadPlan};

use crate::{
    context::RenderContext,
    entity::Entity,
    schema::Registry,
    types::EntityId,
};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

///
/// PreloadMap
///
/// Bulk-fetch output: named slots, each mapping entity id to the fetched
/// value for that entity.
///

pub type PreloadMap = BTreeMap<&'static str, BTreeMap<EntityId, Value>>;

///
/// Preloader
///
/// Bulk-fetch capability for one resource kind. Receives the full
/// deduplicated batch for a render call; per-entity fallback fetching is
/// deliberately not part of this contract.
///

pub trait Preloader: Send + Sync {
    fn preload(
        &self,
        entities: &[Arc<dyn Entity>],
        ctx: &RenderContext,
    ) -> Result<PreloadMap, crate::error::RenderError>;
}

///
/// Coordinator
///

pub struct Coordinator<'a> {
    registry: &'a Registry,
}

impl<'a> Coordinator<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub(crate) const fn registry(&self) -> &'a Registry {
        self.registry
    }
}
