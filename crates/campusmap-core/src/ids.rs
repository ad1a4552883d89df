//! # Identifier Generator
//!
//! Produces opaque, kind-tagged identifiers of the form `<kind>_<uuid>`.
//! Uniqueness comes from a random v4 UUID, so ids generated in one
//! process never collide with ids loaded from a document saved by another.

use crate::types::EntityKind;
use uuid::Uuid;

/// Generate a fresh identifier for an entity of the given kind.
#[must_use]
pub fn generate_id(kind: EntityKind) -> String {
    format!("{}_{}", kind.prefix(), Uuid::new_v4().simple())
}

/// Recover the kind tag from an identifier produced by [`generate_id`].
///
/// Returns `None` for identifiers supplied by callers in another shape.
#[must_use]
pub fn kind_of(id: &str) -> Option<EntityKind> {
    let (prefix, rest) = id.split_once('_')?;
    if rest.is_empty() {
        return None;
    }
    [
        EntityKind::Node,
        EntityKind::Edge,
        EntityKind::Space,
        EntityKind::Building,
        EntityKind::Floor,
    ]
    .into_iter()
    .find(|kind| kind.prefix() == prefix)
}
