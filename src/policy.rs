//! The policy selector: a pure function answering "among all free areas
//! across all sources, given this policy, what's the best candidate for
//! `needed` extents, or none?" It never mutates state; the allocators
//! (`simple`, `sync_rounds`) own all area mutation.

use crate::request::{AllocPolicy, TagMatch};
use crate::segment::Segment;
use crate::source::Source;

/// A located, not-yet-taken, free area: an index into `sources` and into
/// that source's `areas()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub source_idx: usize,
    pub area_idx: usize,
}

/// The request-derived parameters the selector needs, bundled so the
/// allocators don't have to thread five separate arguments through every
/// call into a retry loop.
pub(crate) struct PolicyContext<'a, H> {
    pub policy: AllocPolicy,
    pub can_split: bool,
    pub parallel_areas: &'a [Segment<H>],
    pub tag_list: &'a [TagMatch],
    pub maximise_cling: bool,
}

/// Dispatches to the policy-specific search.
pub(crate) fn find_area<H: Copy + PartialEq>(
    sources: &[Source<H>],
    needed: u64,
    ctx: &PolicyContext<H>,
) -> Option<Candidate> {
    match ctx.policy {
        AllocPolicy::Anywhere => find_anywhere(sources),
        AllocPolicy::Normal => find_normal(sources, needed, ctx.can_split),
        AllocPolicy::Contiguous => find_contiguous(sources, needed),
        AllocPolicy::Cling => find_cling(sources, needed, ctx),
        AllocPolicy::ClingByTags => find_cling_by_tags(sources, needed, ctx),
    }
}

fn find_anywhere<H>(sources: &[Source<H>]) -> Option<Candidate> {
    for (source_idx, source) in sources.iter().enumerate() {
        for (area_idx, area) in source.areas().iter().enumerate() {
            if area.unreserved() > 0 {
                return Some(Candidate {
                    source_idx,
                    area_idx,
                });
            }
        }
    }
    None
}

fn find_normal<H>(sources: &[Source<H>], needed: u64, can_split: bool) -> Option<Candidate> {
    if !can_split {
        for (source_idx, source) in sources.iter().enumerate() {
            for (area_idx, area) in source.areas().iter().enumerate() {
                if area.count() >= needed && area.unreserved() >= needed {
                    return Some(Candidate {
                        source_idx,
                        area_idx,
                    });
                }
            }
        }
        return None;
    }

    let mut best: Option<Candidate> = None;
    let mut best_size = 0u64;
    for (source_idx, source) in sources.iter().enumerate() {
        for (area_idx, area) in source.areas().iter().enumerate() {
            if area.unreserved() == 0 {
                continue;
            }
            if area.unreserved() > best_size {
                best_size = area.unreserved();
                best = Some(Candidate {
                    source_idx,
                    area_idx,
                });
            }
        }
    }
    best
}

fn find_contiguous<H>(sources: &[Source<H>], needed: u64) -> Option<Candidate> {
    for (source_idx, source) in sources.iter().enumerate() {
        for (area_idx, area) in source.areas().iter().enumerate() {
            if area.unreserved() >= needed && area.count() >= needed {
                return Some(Candidate {
                    source_idx,
                    area_idx,
                });
            }
        }
    }
    None
}

fn find_cling<H: Copy + PartialEq>(
    sources: &[Source<H>],
    needed: u64,
    ctx: &PolicyContext<H>,
) -> Option<Candidate> {
    if ctx.parallel_areas.is_empty() {
        return find_normal(sources, needed, ctx.can_split);
    }

    for (source_idx, source) in sources.iter().enumerate() {
        let found_in_parallel = ctx
            .parallel_areas
            .iter()
            .any(|seg| seg.source_handle == source.handle());
        if !found_in_parallel {
            continue;
        }
        if let Some(area_idx) = first_fitting_area(source, needed, ctx.can_split) {
            return Some(Candidate {
                source_idx,
                area_idx,
            });
        }
    }

    if !ctx.maximise_cling {
        find_normal(sources, needed, ctx.can_split)
    } else {
        None
    }
}

fn find_cling_by_tags<H: Copy + PartialEq>(
    sources: &[Source<H>],
    needed: u64,
    ctx: &PolicyContext<H>,
) -> Option<Candidate> {
    if ctx.tag_list.is_empty() {
        return find_cling(sources, needed, ctx);
    }
    if ctx.parallel_areas.is_empty() {
        return find_normal(sources, needed, ctx.can_split);
    }

    for (source_idx, source) in sources.iter().enumerate() {
        let has_matching_tag = ctx.parallel_areas.iter().any(|seg| {
            sources
                .iter()
                .filter(|parallel_src| parallel_src.handle() == seg.source_handle)
                .any(|parallel_src| {
                    ctx.tag_list
                        .iter()
                        .any(|tag| tag.matches(source, parallel_src))
                })
        });
        if !has_matching_tag {
            continue;
        }
        if let Some(area_idx) = first_fitting_area(source, needed, ctx.can_split) {
            return Some(Candidate {
                source_idx,
                area_idx,
            });
        }
    }

    if !ctx.maximise_cling {
        find_normal(sources, needed, ctx.can_split)
    } else {
        None
    }
}

/// The first area on `source` big enough for `needed`: under splitting,
/// "big enough" only requires free space at all; without splitting the
/// area must be wholly big enough.
fn first_fitting_area<H>(source: &Source<H>, needed: u64, can_split: bool) -> Option<usize> {
    source.areas().iter().position(|area| {
        if area.unreserved() < needed {
            return false;
        }
        can_split || area.count() >= needed
    })
}
