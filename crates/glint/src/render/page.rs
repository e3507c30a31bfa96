//! Cursor-paged envelope rendering.
//!
//! One generic envelope parameterized by the inner resource kind and the
//! data key; never a copy-pasted schema per resource.

use crate::{cursor, entity::Entity, error::RenderError};
use serde_json::{Map, Value};
use std::sync::Arc;

///
/// PageRequest
///

#[derive(Clone, Debug, Default)]
pub struct PageRequest {
    pub limit: usize,
    pub cursor: Option<String>,
}

impl PageRequest {
    #[must_use]
    pub const fn first(limit: usize) -> Self {
        Self {
            limit,
            cursor: None,
        }
    }

    #[must_use]
    pub fn after(limit: usize, cursor: impl Into<String>) -> Self {
        Self {
            limit,
            cursor: Some(cursor.into()),
        }
    }
}

///
/// PageSpec
///
/// Envelope shape: the array key plus the fixed cursor fields.
///

#[derive(Clone, Copy, Debug)]
pub struct PageSpec {
    pub data_key: &'static str,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self { data_key: "data" }
    }
}

impl PageSpec {
    #[must_use]
    pub const fn new(data_key: &'static str) -> Self {
        Self { data_key }
    }
}

///
/// PageWindow
///
/// Offset-resolved slice of the underlying items plus the outgoing
/// cursors. Cursor math happens before any preload so the fetch wave only
/// covers entities that will actually render.
///

pub(crate) struct PageWindow<'a> {
    pub items: &'a [Arc<dyn Entity>],
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
}

pub(crate) fn resolve_window<'a>(
    items: &'a [Arc<dyn Entity>],
    request: &PageRequest,
) -> Result<PageWindow<'a>, RenderError> {
    if request.limit == 0 {
        return Err(RenderError::InvalidPageLimit);
    }

    let offset = match &request.cursor {
        Some(token) => usize::try_from(cursor::decode_offset(token)?).unwrap_or(usize::MAX),
        None => 0,
    };

    let start = offset.min(items.len());
    let end = start.saturating_add(request.limit).min(items.len());

    let prev_cursor = (start > 0)
        .then(|| cursor::encode_offset(start.saturating_sub(request.limit) as u64));
    let next_cursor = (end < items.len()).then(|| cursor::encode_offset(end as u64));

    Ok(PageWindow {
        items: &items[start..end],
        next_cursor,
        prev_cursor,
    })
}

/// Assemble the envelope around already-rendered page items.
#[must_use]
pub(crate) fn envelope(
    spec: PageSpec,
    rendered: Vec<Value>,
    next_cursor: Option<String>,
    prev_cursor: Option<String>,
) -> Value {
    let mut out = Map::new();
    out.insert(
        "next_cursor".to_string(),
        next_cursor.map_or(Value::Null, Value::String),
    );
    out.insert(
        "prev_cursor".to_string(),
        prev_cursor.map_or(Value::Null, Value::String),
    );
    out.insert(spec.data_key.to_string(), Value::Array(rendered));

    Value::Object(out)
}
