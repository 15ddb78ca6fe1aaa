//! Resolution of hash-based references to concrete bundle objects.
//!
//! Tasks and triggers point at actions, sub-workflows and trigger types by an
//! id that is not a key into `objects`. A reference records every location
//! path where a target is used, and the target itself by content hash, so
//! resolving an id means finding a reference whose locations mention the id
//! and then the object carrying that reference's hash.

use crate::bundle::{Bundle, BundleObject, Reference};
use ahash::AHashMap;
use tracing::trace;

/// Characters that separate segments of a location path.
const LOCATION_SEPARATORS: &[char] = &['.', '[', ']', ':', '/'];

/// Resolves `ref_id` by linear scan, exactly as the export format defines it.
///
/// The first reference (in document order) with a location containing
/// `ref_id` as a substring is selected, then the first object whose identity
/// equals its `src_key_hash`. Returns `None` when either step misses.
pub fn resolve_reference<'b>(ref_id: &str, bundle: &'b Bundle) -> Option<&'b BundleObject> {
    if ref_id.is_empty() {
        return None;
    }
    let reference = find_by_substring(ref_id, bundle)?;
    bundle
        .objects
        .values()
        .find(|object| object.identity() == Some(reference.src_key_hash.as_str()))
}

fn find_by_substring<'b>(ref_id: &str, bundle: &'b Bundle) -> Option<&'b Reference> {
    bundle
        .references()
        .map(|(_, reference)| reference)
        .find(|reference| reference.locations.iter().any(|loc| loc.contains(ref_id)))
}

/// Lookup tables built once per bundle.
///
/// Positions point into the bundle's ordered maps, so an index is only valid
/// for the bundle it was built from.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    by_segment: AHashMap<String, usize>,
    by_hash: AHashMap<String, usize>,
}

impl ReferenceIndex {
    pub fn build(bundle: &Bundle) -> Self {
        let mut by_segment = AHashMap::new();
        for (position, (_, reference)) in bundle.references().enumerate() {
            for location in &reference.locations {
                for segment in location.split(LOCATION_SEPARATORS).filter(|s| !s.is_empty()) {
                    by_segment.entry(segment.to_string()).or_insert(position);
                }
            }
        }

        let mut by_hash = AHashMap::new();
        for (position, object) in bundle.objects.values().enumerate() {
            if let Some(identity) = object.identity() {
                by_hash.entry(identity.to_string()).or_insert(position);
            }
        }

        Self {
            by_segment,
            by_hash,
        }
    }
}

/// Resolves ids against one bundle using a prebuilt [`ReferenceIndex`].
///
/// An exact match on a location path segment is preferred. When no segment
/// matches, the substring scan of [`resolve_reference`] is used so exports
/// whose locations embed ids in other ways still resolve.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    bundle: &'a Bundle,
    index: &'a ReferenceIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(bundle: &'a Bundle, index: &'a ReferenceIndex) -> Self {
        Self { bundle, index }
    }

    pub fn bundle(&self) -> &'a Bundle {
        self.bundle
    }

    pub fn resolve(&self, ref_id: &str) -> Option<&'a BundleObject> {
        if ref_id.is_empty() {
            return None;
        }
        let reference = self
            .exact_reference(ref_id)
            .or_else(|| find_by_substring(ref_id, self.bundle));
        let Some(reference) = reference else {
            trace!(ref_id, "No reference location mentions id");
            return None;
        };
        self.object_for(ref_id, reference)
    }

    /// Resolves `ref_id` only when it is a whole segment of some location.
    ///
    /// Ids that are not action or trigger-type ids go through here so a
    /// location that merely contains them never matches.
    pub fn resolve_exact(&self, ref_id: &str) -> Option<&'a BundleObject> {
        let reference = self.exact_reference(ref_id)?;
        self.object_for(ref_id, reference)
    }

    /// Tries each id in order and returns the first that resolves.
    pub fn resolve_first<'i, I>(&self, ids: I) -> Option<&'a BundleObject>
    where
        I: IntoIterator<Item = &'i str>,
    {
        ids.into_iter().find_map(|id| self.resolve(id))
    }

    fn object_for(&self, ref_id: &str, reference: &Reference) -> Option<&'a BundleObject> {
        let object = self
            .index
            .by_hash
            .get(&reference.src_key_hash)
            .and_then(|&position| self.bundle.objects.get_index(position))
            .map(|(_, object)| object);
        if object.is_none() {
            trace!(ref_id, hash = %reference.src_key_hash, "Referenced hash has no object");
        }
        object
    }

    fn exact_reference(&self, ref_id: &str) -> Option<&'a Reference> {
        let position = *self.index.by_segment.get(ref_id)?;
        self.bundle
            .references
            .as_ref()?
            .get_index(position)
            .map(|(_, reference)| reference)
    }
}
