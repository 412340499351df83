//! The source catalog: an abstraction of one device's free space, and the
//! ordered list of such devices available to a request.

use std::collections::HashSet;

/// One contiguous free region inside a [`Source`].
///
/// `unreserved` tracks extents not yet tentatively set aside during one
/// allocation call; at rest (outside a single round of the synchronized
/// allocator) `unreserved == count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area<H> {
    start: u64,
    count: u64,
    unreserved: u64,
    source_handle: H,
}

impl<H: Copy> Area<H> {
    fn new(start: u64, count: u64, source_handle: H) -> Self {
        Area {
            start,
            count,
            unreserved: count,
            source_handle,
        }
    }

    /// Starting extent index inside the owning source.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of contiguous free extents remaining.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Extents not yet tentatively reserved this allocation call.
    pub fn unreserved(&self) -> u64 {
        self.unreserved
    }

    /// The opaque handle propagated into output segments taken from this
    /// area. Usually, but not necessarily, equal to the owning source's
    /// handle.
    pub fn source_handle(&self) -> H {
        self.source_handle
    }

    pub(crate) fn set_unreserved(&mut self, value: u64) {
        debug_assert!(value <= self.count);
        self.unreserved = value;
    }

    /// Takes `taken` extents off the front of this area, advancing `start`
    /// and shrinking both `count` and `unreserved` by the same amount.
    pub(crate) fn take(&mut self, taken: u64) -> u64 {
        debug_assert!(taken <= self.count);
        debug_assert!(taken <= self.unreserved);
        let start = self.start;
        self.start += taken;
        self.count -= taken;
        self.unreserved -= taken;
        start
    }
}

/// An abstraction of one device contributing free space, identified by an
/// opaque handle the engine treats purely as an equality key.
#[derive(Debug, Clone)]
pub struct Source<H> {
    handle: H,
    areas: Vec<Area<H>>,
    tags: HashSet<String>,
    pe_count: u64,
}

impl<H: Copy + PartialEq> Source<H> {
    /// Creates a fresh source with no free areas and no tags.
    pub fn new(handle: H) -> Self {
        Source {
            handle,
            areas: Vec::new(),
            tags: HashSet::new(),
            pe_count: 0,
        }
    }

    /// Creates a fresh source carrying an informational total-extent count.
    pub fn with_pe_count(handle: H, pe_count: u64) -> Self {
        Source {
            pe_count,
            ..Self::new(handle)
        }
    }

    /// The opaque identifier for this device.
    pub fn handle(&self) -> H {
        self.handle
    }

    /// Informational total-extent count of the device.
    pub fn pe_count(&self) -> u64 {
        self.pe_count
    }

    /// Attaches a tag, consulted only by [`crate::request::AllocPolicy::ClingByTags`].
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    /// Whether this source carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether this source shares any tag with `other`.
    pub fn shares_any_tag(&self, other: &Source<H>) -> bool {
        self.tags.iter().any(|t| other.tags.contains(t))
    }

    /// Inserts a new free area, maintaining the size-descending order the
    /// policy selector relies on. Insertion is a linear scan from the head:
    /// adequate because per-device free-fragment counts are small.
    ///
    /// `source_handle` is the opaque value propagated into segments carved
    /// from this area; it need not equal `self.handle()`, though callers
    /// typically pass the same value for both.
    pub fn add_area(&mut self, start: u64, count: u64, source_handle: H) {
        if count == 0 {
            return;
        }
        let area = Area::new(start, count, source_handle);
        let pos = self
            .areas
            .iter()
            .position(|a| count > a.count)
            .unwrap_or(self.areas.len());
        self.areas.insert(pos, area);
    }

    /// The free areas of this source, largest first.
    pub fn areas(&self) -> &[Area<H>] {
        &self.areas
    }

    pub(crate) fn areas_mut(&mut self) -> &mut [Area<H>] {
        &mut self.areas
    }

    pub(crate) fn area_mut(&mut self, index: usize) -> &mut Area<H> {
        &mut self.areas[index]
    }
}

/// An ordered collection of [`Source`]s available to one allocation request.
///
/// A thin newtype over `Vec<Source<H>>`, so callers can build up a
/// request's sources independently of the request itself.
#[derive(Debug, Clone, Default)]
pub struct SourceList<H>(Vec<Source<H>>);

impl<H> SourceList<H> {
    /// Creates a fresh, empty source list.
    pub fn new() -> Self {
        SourceList(Vec::new())
    }

    /// Appends a source to the list.
    pub fn push(&mut self, source: Source<H>) {
        self.0.push(source);
    }

    /// Consumes the list, yielding its sources in insertion order.
    pub fn into_vec(self) -> Vec<Source<H>> {
        self.0
    }

    /// The number of sources in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no sources.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<H> FromIterator<Source<H>> for SourceList<H> {
    fn from_iter<I: IntoIterator<Item = Source<H>>>(iter: I) -> Self {
        SourceList(iter.into_iter().collect())
    }
}

impl<H> From<SourceList<H>> for Vec<Source<H>> {
    fn from(list: SourceList<H>) -> Self {
        list.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_area_keeps_size_descending_order() {
        let mut src = Source::new(1u32);
        src.add_area(0, 30, 1);
        src.add_area(100, 100, 1);
        src.add_area(50, 40, 1);
        let counts: Vec<u64> = src.areas().iter().map(Area::count).collect();
        assert_eq!(counts, vec![100, 40, 30]);
    }

    #[test]
    fn add_area_ties_keep_insertion_order_after_existing_equal_areas() {
        let mut src = Source::new(1u32);
        src.add_area(0, 10, 1);
        src.add_area(10, 10, 1);
        src.add_area(20, 20, 1);
        let starts: Vec<u64> = src.areas().iter().map(Area::start).collect();
        assert_eq!(starts, vec![20, 0, 10]);
    }

    #[test]
    fn zero_count_area_is_not_inserted() {
        let mut src = Source::new(1u32);
        src.add_area(0, 0, 1);
        assert!(src.areas().is_empty());
    }

    #[test]
    fn take_advances_start_and_shrinks_count() {
        let mut area = Area::new(10, 50, 1u32);
        let start = area.take(20);
        assert_eq!(start, 10);
        assert_eq!(area.start(), 30);
        assert_eq!(area.count(), 30);
        assert_eq!(area.unreserved(), 30);
    }
}
