use serde::Serialize;
use std::collections::BTreeSet;

///
/// ViewDef
///
/// A named field subset. `includes` pulls in every tag visible under the
/// named views, transitively; expansion tolerates self and cyclic includes
/// by tracking visited names.
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ViewDef {
    pub name: &'static str,
    pub includes: &'static [&'static str],
}

impl ViewDef {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, includes: &[] }
    }

    #[must_use]
    pub const fn with_includes(name: &'static str, includes: &'static [&'static str]) -> Self {
        Self { name, includes }
    }
}

/// Expand a view name into the full set of tags it covers.
///
/// A name with no `ViewDef` expands to just itself, so simple tag-only
/// views need no declaration.
#[must_use]
pub fn expand(views: &[ViewDef], name: &'static str) -> BTreeSet<&'static str> {
    let mut tags = BTreeSet::new();
    let mut stack = vec![name];

    while let Some(current) = stack.pop() {
        if !tags.insert(current) {
            continue;
        }
        if let Some(def) = views.iter().find(|v| v.name == current) {
            stack.extend(def.includes);
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_is_transitive() {
        let views = [
            ViewDef::with_includes("extended", &["with_token"]),
            ViewDef::with_includes("full", &["extended"]),
            ViewDef::new("with_token"),
        ];

        let tags = expand(&views, "full");
        assert!(tags.contains("full"));
        assert!(tags.contains("extended"));
        assert!(tags.contains("with_token"));
    }

    #[test]
    fn cyclic_includes_terminate() {
        let views = [
            ViewDef::with_includes("a", &["b"]),
            ViewDef::with_includes("b", &["a"]),
        ];

        let tags = expand(&views, "a");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn undeclared_view_expands_to_itself() {
        assert_eq!(expand(&[], "with_token").len(), 1);
    }
}
