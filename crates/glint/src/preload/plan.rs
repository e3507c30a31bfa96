use crate::{
    entity::{Entity, Related},
    error::RenderError,
    preload::Coordinator,
    types::{EntityId, ResourceKind},
};
use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    sync::Arc,
};

///
/// PreloadPlan
///
/// One batch per resource kind that declares a preloader, in breadth-first
/// discovery order. Batches are deduplicated by entity id; an entity
/// appearing under multiple parents is fetched once.
///

#[derive(Default)]
pub struct PreloadPlan {
    batches: Vec<PlanBatch>,
}

impl PreloadPlan {
    #[must_use]
    pub fn batches(&self) -> &[PlanBatch] {
        &self.batches
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    #[must_use]
    pub fn batch(&self, kind: ResourceKind) -> Option<&PlanBatch> {
        self.batches.iter().find(|b| b.kind == kind)
    }
}

///
/// PlanBatch
///

pub struct PlanBatch {
    pub(crate) kind: ResourceKind,
    pub(crate) entities: Vec<Arc<dyn Entity>>,
}

impl PlanBatch {
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub fn entities(&self) -> &[Arc<dyn Entity>] {
        &self.entities
    }

    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id()).collect()
    }
}

impl Coordinator<'_> {
    /// Walk the association graph from the roots and collect every
    /// preloadable resource kind's batch.
    ///
    /// Associations carrying a custom resolve function are opaque here:
    /// neither their entities nor anything reachable through them joins a
    /// batch. A visited `(kind, id)` set bounds traversal over shared
    /// subtrees and cyclic data.
    pub fn plan(
        &self,
        roots: &[Arc<dyn Entity>],
        kind: ResourceKind,
    ) -> Result<PreloadPlan, RenderError> {
        let mut batches: Vec<PlanBatch> = Vec::new();
        let mut batch_index: BTreeMap<ResourceKind, usize> = BTreeMap::new();
        let mut batched_ids: BTreeMap<ResourceKind, BTreeSet<EntityId>> = BTreeMap::new();
        let mut visited: BTreeSet<(ResourceKind, EntityId)> = BTreeSet::new();

        let mut queue: VecDeque<(ResourceKind, Arc<dyn Entity>)> = roots
            .iter()
            .map(|entity| (kind, entity.clone()))
            .collect();

        while let Some((kind, entity)) = queue.pop_front() {
            if !visited.insert((kind, entity.id())) {
                continue;
            }

            let schema = self
                .registry()
                .get(kind)
                .ok_or(RenderError::UnknownResource { kind })?;

            if schema.preloadable().is_some() {
                let ids = batched_ids.entry(kind).or_default();
                if ids.insert(entity.id()) {
                    let idx = *batch_index.entry(kind).or_insert_with(|| {
                        batches.push(PlanBatch {
                            kind,
                            entities: Vec::new(),
                        });
                        batches.len() - 1
                    });
                    batches[idx].entities.push(entity.clone());
                }
            }

            for assoc in schema.associations().iter() {
                if assoc.resolve.is_some() {
                    continue;
                }
                match entity.related(assoc.name) {
                    None | Some(Related::None) => {}
                    Some(Related::One(child)) => queue.push_back((assoc.target, child)),
                    Some(Related::Many(children)) => {
                        queue.extend(children.into_iter().map(|child| (assoc.target, child)));
                    }
                }
            }
        }

        Ok(PreloadPlan { batches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::RenderContext,
        entity::Record,
        preload::{PreloadMap, Preloader},
        schema::{AssociationSpec, Registry, RegistryBuilder, ResourceSchema},
    };

    const COMMENT: ResourceKind = ResourceKind("Comment");
    const MEMBER: ResourceKind = ResourceKind("Member");

    struct NoopPreloader;

    impl Preloader for NoopPreloader {
        fn preload(
            &self,
            _entities: &[Arc<dyn Entity>],
            _ctx: &RenderContext,
        ) -> Result<PreloadMap, RenderError> {
            Ok(PreloadMap::new())
        }
    }

    fn registry(member_via_block: bool) -> Registry {
        let author = if member_via_block {
            AssociationSpec::one("author", MEMBER)
                .resolved_with(|entity, _ctx| Ok(entity.related("author").unwrap_or_default()))
        } else {
            AssociationSpec::one("author", MEMBER)
        };

        RegistryBuilder::new()
            .resource(
                ResourceSchema::new(COMMENT)
                    .association(author)
                    .association(AssociationSpec::many("replies", COMMENT)),
            )
            .resource(ResourceSchema::new(MEMBER).preloader(Arc::new(NoopPreloader)))
            .build()
            .expect("plan test registry should build")
    }

    fn comment(id: u64, author_id: u64, replies: Vec<Arc<dyn Entity>>) -> Arc<dyn Entity> {
        Record::new(COMMENT, id)
            .one("author", Record::new(MEMBER, author_id).shared())
            .many("replies", replies)
            .shared()
    }

    #[test]
    fn authors_shared_across_comments_are_planned_once() {
        let registry = registry(false);
        let coordinator = Coordinator::new(&registry);

        // 10 comments over 3 underlying members
        let roots: Vec<Arc<dyn Entity>> = (0..10)
            .map(|i| comment(i, 100 + (i % 3), Vec::new()))
            .collect();

        let plan = coordinator.plan(&roots, COMMENT).unwrap();
        let batch = plan.batch(MEMBER).expect("member batch should exist");
        assert_eq!(batch.ids().len(), 3);
    }

    #[test]
    fn nested_replies_contribute_their_authors() {
        let registry = registry(false);
        let coordinator = Coordinator::new(&registry);

        let reply = comment(2, 201, Vec::new());
        let root = comment(1, 200, vec![reply]);

        let plan = coordinator.plan(&[root], COMMENT).unwrap();
        let batch = plan.batch(MEMBER).unwrap();
        assert_eq!(batch.ids(), vec![EntityId(200), EntityId(201)]);
    }

    #[test]
    fn block_resolved_associations_are_skipped_entirely() {
        let registry = registry(true);
        let coordinator = Coordinator::new(&registry);

        let root = comment(1, 200, Vec::new());
        let plan = coordinator.plan(&[root], COMMENT).unwrap();

        assert!(plan.batch(MEMBER).is_none());
        assert!(plan.is_empty());
    }

    #[test]
    fn cyclic_reply_graphs_terminate() {
        let registry = registry(false);
        let coordinator = Coordinator::new(&registry);

        // two comments pointing at each other through replies
        let a = comment(1, 200, Vec::new());
        let b = Record::new(COMMENT, 2)
            .one("author", Record::new(MEMBER, 201).shared())
            .many("replies", vec![a.clone()])
            .shared();
        let a = Record::new(COMMENT, 1)
            .one("author", Record::new(MEMBER, 200).shared())
            .many("replies", vec![b.clone()])
            .shared();

        let plan = coordinator.plan(&[a, b], COMMENT).unwrap();
        let batch = plan.batch(MEMBER).unwrap();
        assert_eq!(batch.ids().len(), 2);
    }
}
