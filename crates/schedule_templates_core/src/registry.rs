//! Built-in template catalog.
//!
//! # Responsibility
//! - Hold the fixed list of templates shipped with the application.
//!
//! # Invariants
//! - Ids follow `template-1`, `template-2`, ... and never change between
//!   sessions, so "the first built-in" is a stable fallback.
//! - The catalog is immutable after first access.

use crate::model::template::Template;
use once_cell::sync::Lazy;

static BUILT_IN_TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    vec![
        Template::built_in(
            "template-1",
            "القالب الأول",
            Some("/template-previews/preview_1.png"),
            "/templates/قالب_1.xlsx",
        ),
        Template::built_in(
            "template-2",
            "القالب الثاني",
            Some("/template-previews/preview_2.png"),
            "/templates/قالب_2.xlsx",
        ),
        Template::built_in(
            "template-3",
            "القالب الثالث",
            Some("/template-previews/preview_3.png"),
            "/templates/قالب_3.xlsx",
        ),
        Template::built_in(
            "template-4",
            "القالب الرابع",
            Some("/template-previews/preview_4.png"),
            "/templates/قالب_4.xlsx",
        ),
    ]
});

/// Returns built-in templates in catalog order.
pub fn built_in_templates() -> &'static [Template] {
    BUILT_IN_TEMPLATES.as_slice()
}

/// Returns the id used whenever the active pointer needs a fallback.
pub fn first_built_in_id() -> &'static str {
    // The catalog is a non-empty literal.
    BUILT_IN_TEMPLATES[0].id.as_str()
}

pub fn find_built_in(id: &str) -> Option<&'static Template> {
    BUILT_IN_TEMPLATES.iter().find(|template| template.id == id)
}

pub fn is_built_in_id(id: &str) -> bool {
    find_built_in(id).is_some()
}
