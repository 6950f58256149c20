// Spatial index feed.
// Preroll gathers device-space leaf bounds; an embedder-provided index consumes them.

use super::layers::Rect;

/// A spatial index over leaf bounds, supplied by the embedder.
///
/// The layer tree only feeds it. No implementation ships with this crate.
pub trait SpatialIndex {
    /// Indexes `(bounds, layer id)` pairs. Bounds are in device space.
    fn insert(&mut self, entries: &[(Rect, u64)]);

    /// Ids of the entries overlapping `query`, sorted ascending.
    fn search(&self, query: Rect) -> Vec<u64>;

    /// Bounds of the entries overlapping `query`, with overlapping results merged.
    fn search_and_consolidate(&self, query: Rect) -> Vec<Rect>;
}
