//! Configuration fingerprints
//!
//! Two reflectors that could produce different output for the same type
//! must fingerprint differently. Hooks are compared by identity (the address
//! of their `Arc`), so cloning a reflector keeps its fingerprint while
//! installing a new closure changes it.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::reflector::Reflector;

/// Hash every output-affecting option of `reflector`
pub(crate) fn fingerprint(reflector: &Reflector) -> u64 {
    let mut hasher = FxHasher::default();

    [
        reflector.anonymous,
        reflector.assign_anchor,
        reflector.allow_additional_properties,
        reflector.required_from_annotation_only,
        reflector.do_not_reference,
        reflector.expanded_struct,
    ]
    .hash(&mut hasher);

    reflector.name_tag().hash(&mut hasher);
    reflector.base_id.as_str().hash(&mut hasher);

    hasher.write_usize(hook_identity(reflector.lookup.as_ref()));
    hasher.write_usize(hook_identity(reflector.mapper.as_ref()));
    hasher.write_usize(hook_identity(reflector.namer.as_ref()));
    hasher.write_usize(hook_identity(reflector.key_namer.as_ref()));
    hasher.write_usize(hook_identity(reflector.additional_fields.as_ref()));
    hasher.write_usize(hook_identity(reflector.lookup_comment.as_ref()));

    match &reflector.comment_map {
        Some(comments) => {
            hasher.write_usize(comments.len());
            hasher.write_usize(hook_identity(Some(comments)));
        }
        None => hasher.write_usize(0),
    }

    for ty in &reflector.ignored_types {
        ty.id().hash(&mut hasher);
    }

    hasher.finish()
}

fn hook_identity<T: ?Sized>(hook: Option<&Arc<T>>) -> usize {
    hook.map_or(0, |hook| Arc::as_ptr(hook) as *const () as usize)
}
