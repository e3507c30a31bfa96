use crate::{
    context::RenderContext,
    error::RenderError,
    obs::{PipelineEvent, sink},
    preload::{Coordinator, PreloadPlan},
};

impl Coordinator<'_> {
    /// Run every planned batch, exactly once per resource kind, and merge
    /// the results into the context.
    ///
    /// Execution is fail-fast: the first batch error aborts the render and
    /// no partial output is ever produced downstream. The context is the
    /// single writer here; once this returns, the render phase only reads.
    pub fn execute(
        &self,
        plan: &PreloadPlan,
        ctx: &mut RenderContext,
    ) -> Result<(), RenderError> {
        for batch in plan.batches() {
            ctx.check_deadline()?;

            let Some(schema) = self.registry().get(batch.kind()) else {
                return Err(RenderError::UnknownResource { kind: batch.kind() });
            };
            let Some(preloader) = schema.preloadable() else {
                // plan only batches preloadable kinds
                continue;
            };

            sink::record(PipelineEvent::PreloadStart {
                resource: batch.kind(),
                entities: batch.entities().len(),
            });

            let map = preloader.preload(batch.entities(), ctx)?;

            sink::record(PipelineEvent::PreloadFinish {
                resource: batch.kind(),
                entities: batch.entities().len(),
                slots: map.len(),
            });

            ctx.merge_preloaded(batch.kind(), map);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::{Organization, RenderContext, UrlBuilder, Viewer},
        entity::{Entity, Record},
        preload::{PreloadMap, Preloader},
        schema::{RegistryBuilder, ResourceSchema},
        types::{EntityId, ResourceKind},
    };
    use serde_json::json;
    use std::{
        collections::BTreeMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    const MEMBER: ResourceKind = ResourceKind("Member");

    struct NullUrls;

    impl UrlBuilder for NullUrls {
        fn entity_url(&self, kind: ResourceKind, id: EntityId) -> String {
            format!("/{kind}/{id}")
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new(
            Viewer::guest(EntityId(1)),
            Organization::new(1, "acme"),
            Arc::new(NullUrls),
        )
    }

    struct CountingPreloader {
        calls: AtomicUsize,
    }

    impl Preloader for CountingPreloader {
        fn preload(
            &self,
            entities: &[Arc<dyn Entity>],
            _ctx: &RenderContext,
        ) -> Result<PreloadMap, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let statuses = entities
                .iter()
                .map(|e| (e.id(), json!("active")))
                .collect::<BTreeMap<_, _>>();

            Ok(PreloadMap::from([("statuses", statuses)]))
        }
    }

    struct FailingPreloader;

    impl Preloader for FailingPreloader {
        fn preload(
            &self,
            _entities: &[Arc<dyn Entity>],
            _ctx: &RenderContext,
        ) -> Result<PreloadMap, RenderError> {
            Err(RenderError::preload(MEMBER, "bulk lookup timed out"))
        }
    }

    #[test]
    fn each_batch_runs_once_and_merges_into_the_context() {
        let preloader = Arc::new(CountingPreloader {
            calls: AtomicUsize::new(0),
        });
        let registry = RegistryBuilder::new()
            .resource(ResourceSchema::new(MEMBER).preloader(preloader.clone()))
            .build()
            .unwrap();
        let coordinator = Coordinator::new(&registry);

        let roots: Vec<Arc<dyn Entity>> = vec![
            Record::new(MEMBER, 1).shared(),
            Record::new(MEMBER, 2).shared(),
        ];
        let plan = coordinator.plan(&roots, MEMBER).unwrap();

        let mut ctx = ctx();
        coordinator.execute(&plan, &mut ctx).unwrap();

        assert_eq!(preloader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            ctx.preloaded(MEMBER, "statuses", EntityId(2)),
            Some(&json!("active"))
        );
    }

    #[test]
    fn a_failing_batch_aborts_execution() {
        let registry = RegistryBuilder::new()
            .resource(ResourceSchema::new(MEMBER).preloader(Arc::new(FailingPreloader)))
            .build()
            .unwrap();
        let coordinator = Coordinator::new(&registry);

        let roots: Vec<Arc<dyn Entity>> = vec![Record::new(MEMBER, 1).shared()];
        let plan = coordinator.plan(&roots, MEMBER).unwrap();

        let mut ctx = ctx();
        let result = coordinator.execute(&plan, &mut ctx);

        assert!(matches!(result, Err(RenderError::Preload { .. })));
        assert_eq!(ctx.preloaded(MEMBER, "statuses", EntityId(1)), None);
    }
}
