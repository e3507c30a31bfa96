//! Sample team-communication domain for glint testing surfaces.
//!
//! Three resource kinds (members, posts, comments) exercising the whole
//! pipeline: viewer-authorization fields, preload-backed fields, permalink
//! fields, tagged views, self-referential and block-resolved associations.

use glint::prelude::*;
use serde_json::json;
use std::{collections::BTreeMap, sync::Arc};

pub const MEMBER: ResourceKind = ResourceKind("Member");
pub const POST: ResourceKind = ResourceKind("Post");
pub const COMMENT: ResourceKind = ResourceKind("Comment");

pub const MEMBER_ROLES: &[&str] = &["admin", "member", "viewer", "guest"];
pub const POST_STATUSES: &[&str] = &["draft", "published", "archived"];

///
/// AppUrls
///

pub struct AppUrls;

impl UrlBuilder for AppUrls {
    fn entity_url(&self, kind: ResourceKind, id: EntityId) -> String {
        format!("/{}/{id}", kind.as_str().to_ascii_lowercase())
    }
}

/// Request context over the fixture organization.
#[must_use]
pub fn context(viewer: Viewer) -> RenderContext {
    RenderContext::new(viewer, Organization::new(1, "acme"), Arc::new(AppUrls))
}

///
/// PresencePreloader
/// Bulk presence lookup for members; deterministic stand-in for a store.
///

struct PresencePreloader;

impl Preloader for PresencePreloader {
    fn preload(
        &self,
        entities: &[Arc<dyn Entity>],
        _ctx: &RenderContext,
    ) -> Result<PreloadMap, RenderError> {
        let presence = entities
            .iter()
            .map(|e| {
                let state = if e.id().0.is_multiple_of(2) {
                    "active"
                } else {
                    "away"
                };
                (e.id(), json!(state))
            })
            .collect::<BTreeMap<_, _>>();

        Ok(PreloadMap::from([("presence", presence)]))
    }
}

///
/// ReactionPreloader
/// Batched reaction tallies and the viewer's own reaction per comment.
///

struct ReactionPreloader;

impl Preloader for ReactionPreloader {
    fn preload(
        &self,
        entities: &[Arc<dyn Entity>],
        ctx: &RenderContext,
    ) -> Result<PreloadMap, RenderError> {
        let mut counts = BTreeMap::new();
        let mut viewer_reactions = BTreeMap::new();

        for entity in entities {
            let id = entity.id();
            counts.insert(id, json!({ "thumbs_up": id.0 % 5 }));
            if ctx.viewer().member_id.is_some() && id.0.is_multiple_of(2) {
                viewer_reactions.insert(id, json!("thumbs_up"));
            }
        }

        Ok(PreloadMap::from([
            ("reaction_counts", counts),
            ("viewer_reaction", viewer_reactions),
        ]))
    }
}

/// Whether the viewer's organization membership authored this entity.
fn viewer_is_author(entity: &dyn Entity, ctx: &RenderContext) -> bool {
    entity
        .attribute("organization_membership_id")
        .and_then(|v| v.as_u64())
        .is_some_and(|member_id| ctx.viewer().is_member(EntityId(member_id)))
}

#[must_use]
fn member_schema() -> ResourceSchema {
    ResourceSchema::new(MEMBER)
        .field(FieldSpec::scalar("id", WireType::Int))
        .field(FieldSpec::scalar("display_name", WireType::String))
        .field(
            FieldSpec::scalar("role", WireType::String)
                .enums(MEMBER_ROLES)
                .default_value("member"),
        )
        .field(FieldSpec::scalar("avatar_url", WireType::String).nullable())
        .field(FieldSpec::computed(
            "url",
            FieldKind::Scalar(WireType::String),
            |e, ctx| Ok(Computed::value(ctx.entity_url(e.kind(), e.id()))),
        ))
        .field(
            FieldSpec::computed("presence", FieldKind::Scalar(WireType::String), |e, ctx| {
                Ok(ctx
                    .preloaded(MEMBER, "presence", e.id())
                    .cloned()
                    .map_or(Computed::Skip, Computed::Value))
            })
            .nullable(),
        )
        .preloader(Arc::new(PresencePreloader))
}

#[must_use]
fn comment_schema() -> ResourceSchema {
    ResourceSchema::new(COMMENT)
        .field(FieldSpec::scalar("id", WireType::Int))
        .field(FieldSpec::scalar("content", WireType::String))
        .field(FieldSpec::scalar(
            "organization_membership_id",
            WireType::Int,
        ))
        .field(FieldSpec::computed(
            "viewer_is_author",
            FieldKind::Scalar(WireType::Bool),
            |e, ctx| Ok(Computed::value(viewer_is_author(e, ctx))),
        ))
        .field(FieldSpec::computed(
            "viewer_can_edit",
            FieldKind::Scalar(WireType::Bool),
            |e, ctx| Ok(Computed::value(viewer_is_author(e, ctx) || ctx.viewer().admin)),
        ))
        .field(FieldSpec::computed(
            "viewer_can_delete",
            FieldKind::Scalar(WireType::Bool),
            |e, ctx| Ok(Computed::value(viewer_is_author(e, ctx) || ctx.viewer().admin)),
        ))
        .field(
            FieldSpec::computed("reaction_counts", FieldKind::Object, |e, ctx| {
                Ok(ctx
                    .preloaded(COMMENT, "reaction_counts", e.id())
                    .cloned()
                    .map_or(Computed::Skip, Computed::Value))
            })
            .default_value(json!({})),
        )
        .field(
            FieldSpec::computed(
                "viewer_reaction",
                FieldKind::Scalar(WireType::String),
                |e, ctx| {
                    Ok(ctx
                        .preloaded(COMMENT, "viewer_reaction", e.id())
                        .cloned()
                        .map_or(Computed::Skip, Computed::Value))
                },
            )
            .nullable(),
        )
        .field(FieldSpec::computed(
            "url",
            FieldKind::Scalar(WireType::String),
            |e, ctx| Ok(Computed::value(ctx.entity_url(e.kind(), e.id()))),
        ))
        .association(AssociationSpec::one("author", MEMBER))
        .association(AssociationSpec::many("replies", COMMENT))
        // resolved through a block, so the planner must skip it
        .association(
            AssociationSpec::opt("resolved_by", MEMBER)
                .resolved_with(|e, _ctx| Ok(e.related("resolved_by").unwrap_or_default())),
        )
        .preloader(Arc::new(ReactionPreloader))
}

#[must_use]
fn post_schema() -> ResourceSchema {
    ResourceSchema::new(POST)
        .field(FieldSpec::scalar("id", WireType::Int))
        .field(FieldSpec::scalar("title", WireType::String))
        .field(FieldSpec::scalar("description", WireType::String).nullable())
        .field(
            FieldSpec::scalar("status", WireType::String)
                .enums(POST_STATUSES)
                .default_value("draft"),
        )
        .field(FieldSpec::scalar("published", WireType::Bool).default_value(false))
        .field(FieldSpec::scalar("share_token", WireType::String).view("with_token"))
        .field(FieldSpec::computed(
            "viewer_is_author",
            FieldKind::Scalar(WireType::Bool),
            |e, ctx| Ok(Computed::value(viewer_is_author(e, ctx))),
        ))
        .view(ViewDef::new("with_token"))
        .view(ViewDef::with_includes("extended", &["with_token"]))
        .association(AssociationSpec::one("author", MEMBER))
        .association(AssociationSpec::many("comments", COMMENT))
}

/// Build the full fixture registry.
pub fn registry() -> Result<Registry, glint::schema::BuildError> {
    RegistryBuilder::new()
        .resource(member_schema())
        .resource(comment_schema())
        .resource(post_schema())
        .build()
}

/// A member entity; the record id doubles as the organization membership
/// id comments point back at.
#[must_use]
pub fn member(id: u64, display_name: &str, role: &str) -> Record {
    Record::new(MEMBER, id)
        .attr("id", id)
        .attr("display_name", display_name)
        .attr("role", role)
}

/// A comment authored by `author`, with no replies attached.
#[must_use]
pub fn comment(id: u64, content: &str, author: &Arc<dyn Entity>) -> Record {
    Record::new(COMMENT, id)
        .attr("id", id)
        .attr("content", content)
        .attr("organization_membership_id", author.id().0)
        .one("author", author.clone())
        .many("replies", Vec::new())
}

/// A draft post authored by `author`, with no comments attached.
#[must_use]
pub fn post(id: u64, title: &str, author: &Arc<dyn Entity>) -> Record {
    Record::new(POST, id)
        .attr("id", id)
        .attr("title", title)
        .attr("organization_membership_id", author.id().0)
        .attr("share_token", format!("tok-{id}"))
        .one("author", author.clone())
        .many("comments", Vec::new())
}
