//! The transactional-with-rollback pattern the synchronized allocator uses
//! to temporarily hide candidates from the policy selector.
//!
//! Two shapes of hiding are needed and are never nested within each other:
//! hiding every area of one conflicting source (restored with a broad
//! sweep, safe because at rest `unreserved == count` whenever
//! `count > 0`, so any area found with `unreserved == 0 && count > 0` was
//! zeroed by this mechanism and nothing else), and hiding a precise list
//! of previously-selected areas (restored from an exact snapshot, since a
//! broad sweep could also restore areas a caller zeroed for an unrelated
//! reason).

use crate::policy::Candidate;
use crate::source::Source;

/// Zeroes `unreserved` on every area of `sources[source_idx]`.
pub(crate) fn hide_entire_source<H>(sources: &mut [Source<H>], source_idx: usize) {
    for area in sources[source_idx].areas_mut() {
        area.set_unreserved(0);
    }
}

/// Restores every area in `sources` whose `unreserved` was temporarily
/// zeroed by [`hide_entire_source`] back to its resting value (`count`).
pub(crate) fn restore_all_zeroed<H>(sources: &mut [Source<H>]) {
    for source in sources.iter_mut() {
        for area in source.areas_mut() {
            if area.count() > 0 && area.unreserved() == 0 {
                area.set_unreserved(area.count());
            }
        }
    }
}

/// Zeroes `unreserved` on exactly the areas named by `candidates`, skipping
/// any that are already fully reserved, and returns a snapshot to pass to
/// [`restore_snapshot`].
pub(crate) fn hide_candidates<H>(
    sources: &mut [Source<H>],
    candidates: &[Candidate],
) -> Vec<u64> {
    candidates
        .iter()
        .map(|c| {
            let area = sources[c.source_idx].area_mut(c.area_idx);
            let saved = area.unreserved();
            if saved > 0 {
                area.set_unreserved(0);
            }
            saved
        })
        .collect()
}

/// Restores exactly the areas hidden by a prior [`hide_candidates`] call.
pub(crate) fn restore_snapshot<H>(
    sources: &mut [Source<H>],
    candidates: &[Candidate],
    snapshot: &[u64],
) {
    for (c, &saved) in candidates.iter().zip(snapshot.iter()) {
        if saved > 0 {
            sources[c.source_idx].area_mut(c.area_idx).set_unreserved(saved);
        }
    }
}
