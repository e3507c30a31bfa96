use crate::{
    error::RenderError,
    preload::PreloadMap,
    types::{EntityId, ResourceKind},
};
use serde::Serialize;
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc, time::Instant};

///
/// Viewer
///
/// Identity of the requesting user. Computed fields derive authorization
/// answers from this plus the entity's own state; there is no separate
/// authorization phase.
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Viewer {
    pub id: EntityId,
    pub member_id: Option<EntityId>,
    pub admin: bool,
}

impl Viewer {
    #[must_use]
    pub const fn member(id: EntityId, member_id: EntityId) -> Self {
        Self {
            id,
            member_id: Some(member_id),
            admin: false,
        }
    }

    #[must_use]
    pub const fn admin(id: EntityId, member_id: EntityId) -> Self {
        Self {
            id,
            member_id: Some(member_id),
            admin: true,
        }
    }

    /// Viewer with no organization membership (logged-out or external).
    #[must_use]
    pub const fn guest(id: EntityId) -> Self {
        Self {
            id,
            member_id: None,
            admin: false,
        }
    }

    /// True when the viewer's membership matches `member_id`.
    #[must_use]
    pub fn is_member(&self, member_id: EntityId) -> bool {
        self.member_id == Some(member_id)
    }
}

///
/// Organization
///

#[derive(Clone, Debug, Serialize)]
pub struct Organization {
    pub id: EntityId,
    pub slug: String,
}

impl Organization {
    #[must_use]
    pub fn new(id: impl Into<EntityId>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
        }
    }
}

///
/// UrlBuilder
///
/// Permalink construction seam. Consumed via the context, never defined by
/// the pipeline.
///

pub trait UrlBuilder: Send + Sync {
    fn entity_url(&self, kind: ResourceKind, id: EntityId) -> String;
}

///
/// RenderContext
///
/// Per-request state threaded through one top-level render call. The
/// preload phase holds `&mut` and is the only writer; the render phase
/// borrows immutably, so per-entity rendering can never mutate shared
/// state.
///

pub struct RenderContext {
    viewer: Viewer,
    organization: Organization,
    url_builder: Arc<dyn UrlBuilder>,
    options: BTreeMap<String, Value>,
    deadline: Option<Instant>,
    preloaded: BTreeMap<ResourceKind, PreloadMap>,
}

impl RenderContext {
    #[must_use]
    pub fn new(
        viewer: Viewer,
        organization: Organization,
        url_builder: Arc<dyn UrlBuilder>,
    ) -> Self {
        Self {
            viewer,
            organization,
            url_builder,
            options: BTreeMap::new(),
            deadline: None,
            preloaded: BTreeMap::new(),
        }
    }

    /// Attach a caller-supplied option visible to compute functions.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Abort the render (preload and render phases) past this instant.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub const fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    #[must_use]
    pub const fn organization(&self) -> &Organization {
        &self.organization
    }

    #[must_use]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Build a permalink for an entity through the request's URL builder.
    #[must_use]
    pub fn entity_url(&self, kind: ResourceKind, id: EntityId) -> String {
        self.url_builder.entity_url(kind, id)
    }

    pub(crate) fn check_deadline(&self) -> Result<(), RenderError> {
        match self.deadline {
            Some(deadline) if Instant::now() > deadline => Err(RenderError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Deep-merge one resource kind's preload results into the context.
    ///
    /// Slot maps merge key-by-key: results for the same slot arriving from
    /// two merges extend one another instead of overwriting wholesale.
    pub fn merge_preloaded(&mut self, kind: ResourceKind, map: PreloadMap) {
        let namespace = self.preloaded.entry(kind).or_default();
        for (slot, values) in map {
            namespace.entry(slot).or_default().extend(values);
        }
    }

    /// Look up one preloaded value by resource kind, slot, and entity id.
    #[must_use]
    pub fn preloaded(&self, kind: ResourceKind, slot: &str, id: EntityId) -> Option<&Value> {
        self.preloaded.get(&kind)?.get(slot)?.get(&id)
    }

    /// Borrow a whole preloaded slot map for one resource kind.
    #[must_use]
    pub fn preloaded_slot(
        &self,
        kind: ResourceKind,
        slot: &str,
    ) -> Option<&BTreeMap<EntityId, Value>> {
        self.preloaded.get(&kind)?.get(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    struct FlatUrls;

    impl UrlBuilder for FlatUrls {
        fn entity_url(&self, kind: ResourceKind, id: EntityId) -> String {
            format!("/{kind}/{id}")
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new(
            Viewer::member(EntityId(1), EntityId(42)),
            Organization::new(9, "acme"),
            Arc::new(FlatUrls),
        )
    }

    #[test]
    fn options_and_urls_are_readable_from_compute_position() {
        let ctx = ctx().with_option("include_drafts", true);

        assert_eq!(ctx.option("include_drafts"), Some(&json!(true)));
        assert_eq!(ctx.entity_url(ResourceKind("Post"), EntityId(3)), "/Post/3");
        assert!(ctx.viewer().is_member(EntityId(42)));
        assert!(!ctx.viewer().is_member(EntityId(7)));
    }

    #[test]
    fn merge_preloaded_extends_existing_slots_key_by_key() {
        let kind = ResourceKind("Comment");
        let mut ctx = ctx();

        ctx.merge_preloaded(
            kind,
            PreloadMap::from([("counts", BTreeMap::from([(EntityId(1), json!(2))]))]),
        );
        ctx.merge_preloaded(
            kind,
            PreloadMap::from([("counts", BTreeMap::from([(EntityId(2), json!(5))]))]),
        );

        assert_eq!(ctx.preloaded(kind, "counts", EntityId(1)), Some(&json!(2)));
        assert_eq!(ctx.preloaded(kind, "counts", EntityId(2)), Some(&json!(5)));
        assert_eq!(ctx.preloaded(kind, "missing", EntityId(1)), None);
    }

    #[test]
    fn expired_deadline_fails_the_phase_check() {
        let ctx = ctx().with_deadline(Instant::now() - Duration::from_millis(1));

        assert!(matches!(
            ctx.check_deadline(),
            Err(RenderError::DeadlineExceeded)
        ));
    }
}
