use crate::{
    context::RenderContext,
    entity::Entity,
    error::RenderError,
    obs::{PipelineEvent, sink},
    preload::Coordinator,
    render::{
        Renderer,
        page::{self, PageRequest, PageSpec},
    },
    schema::Registry,
    types::{ResourceKind, View},
};
use serde_json::Value;
use std::sync::Arc;

///
/// Pipeline
///
/// Top-level entry point tying the two phases together: plan and execute
/// every preload, then render. Strictly sequential; no field computation
/// ever observes a partially-preloaded context.
///

pub struct Pipeline<'a> {
    registry: &'a Registry,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Render a single entity.
    pub fn one(
        &self,
        entity: &Arc<dyn Entity>,
        kind: ResourceKind,
        ctx: &mut RenderContext,
        view: View,
    ) -> Result<Value, RenderError> {
        let mut items = self.render_batch(std::slice::from_ref(entity), kind, ctx, view)?;

        // render_batch yields exactly one element per input entity
        Ok(items.pop().unwrap_or(Value::Null))
    }

    /// Render a homogeneous collection, preserving input order.
    pub fn many(
        &self,
        entities: &[Arc<dyn Entity>],
        kind: ResourceKind,
        ctx: &mut RenderContext,
        view: View,
    ) -> Result<Value, RenderError> {
        Ok(Value::Array(self.render_batch(entities, kind, ctx, view)?))
    }

    /// Render a cursor-paged envelope over `items`.
    ///
    /// Only the resolved page window is preloaded and rendered.
    pub fn page(
        &self,
        items: &[Arc<dyn Entity>],
        kind: ResourceKind,
        ctx: &mut RenderContext,
        view: View,
        spec: PageSpec,
        request: &PageRequest,
    ) -> Result<Value, RenderError> {
        let window = page::resolve_window(items, request)?;
        let rendered = self.render_batch(window.items, kind, ctx, view)?;

        Ok(page::envelope(
            spec,
            rendered,
            window.next_cursor,
            window.prev_cursor,
        ))
    }

    fn render_batch(
        &self,
        entities: &[Arc<dyn Entity>],
        kind: ResourceKind,
        ctx: &mut RenderContext,
        view: View,
    ) -> Result<Vec<Value>, RenderError> {
        let coordinator = Coordinator::new(self.registry);
        let plan = coordinator.plan(entities, kind)?;
        coordinator.execute(&plan, ctx)?;

        let renderer = Renderer::new(self.registry);
        let rendered = entities
            .iter()
            .map(|entity| renderer.render(entity, kind, ctx, view))
            .collect::<Result<Vec<_>, _>>()?;

        sink::record(PipelineEvent::RenderFinish {
            resource: kind,
            entities: entities.len(),
        });

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::{Organization, UrlBuilder, Viewer},
        entity::Record,
        preload::{PreloadMap, Preloader},
        render::Computed,
        schema::{FieldSpec, RegistryBuilder, ResourceSchema},
        types::{EntityId, FieldKind, WireType},
    };
    use serde_json::json;
    use std::collections::BTreeMap;

    const MEMBER: ResourceKind = ResourceKind("Member");

    struct PathUrls;

    impl UrlBuilder for PathUrls {
        fn entity_url(&self, kind: ResourceKind, id: EntityId) -> String {
            format!("/{kind}/{id}")
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new(
            Viewer::guest(EntityId(1)),
            Organization::new(1, "acme"),
            Arc::new(PathUrls),
        )
    }

    struct StatusPreloader;

    impl Preloader for StatusPreloader {
        fn preload(
            &self,
            entities: &[Arc<dyn Entity>],
            _ctx: &RenderContext,
        ) -> Result<PreloadMap, RenderError> {
            let statuses = entities
                .iter()
                .map(|e| (e.id(), json!("online")))
                .collect::<BTreeMap<_, _>>();

            Ok(PreloadMap::from([("statuses", statuses)]))
        }
    }

    fn registry() -> Registry {
        RegistryBuilder::new()
            .resource(
                ResourceSchema::new(MEMBER)
                    .field(FieldSpec::scalar("display_name", WireType::String))
                    .field(FieldSpec::computed(
                        "status",
                        FieldKind::Scalar(WireType::String),
                        |e, ctx| {
                            Ok(ctx
                                .preloaded(MEMBER, "statuses", e.id())
                                .cloned()
                                .map_or(Computed::Skip, Computed::Value))
                        },
                    ))
                    .preloader(Arc::new(StatusPreloader)),
            )
            .build()
            .unwrap()
    }

    fn member(id: u64, name: &str) -> Arc<dyn Entity> {
        Record::new(MEMBER, id).attr("display_name", name).shared()
    }

    #[test]
    fn one_preloads_then_renders_a_single_object() {
        let registry = registry();
        let pipeline = Pipeline::new(&registry);
        let mut ctx = ctx();

        let out = pipeline
            .one(&member(1, "ada"), MEMBER, &mut ctx, View::Default)
            .unwrap();

        assert_eq!(out, json!({ "display_name": "ada", "status": "online" }));
    }

    #[test]
    fn page_envelopes_only_the_window() {
        let registry = registry();
        let pipeline = Pipeline::new(&registry);
        let mut ctx = ctx();

        let members: Vec<Arc<dyn Entity>> = (0..25)
            .map(|i| member(i, &format!("m{i}")))
            .collect();

        let out = pipeline
            .page(
                &members,
                MEMBER,
                &mut ctx,
                View::Default,
                PageSpec::new("members"),
                &PageRequest::first(10),
            )
            .unwrap();

        assert_eq!(out["members"].as_array().unwrap().len(), 10);
        assert!(out["next_cursor"].is_string());
        assert!(out["prev_cursor"].is_null());
    }
}
