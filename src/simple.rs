//! The simple allocator: each parallel area is filled independently,
//! area-by-area, until its target is met or space runs out.
//!
//! Used whenever synchronization across areas isn't required: a single
//! parallel area, or a multi-area request where `can_split` is false. Note
//! that even here, an individual area may still receive more than one
//! segment; `can_split` governs whether *different* parallel areas may
//! fragment independently, not whether the selector itself ever returns
//! an undersized candidate (`Anywhere` always can).

use log::trace;

use crate::policy::{find_area, PolicyContext};
use crate::request::Request;
use crate::segment::Segment;
#[cfg(test)]
use crate::source::Source;

/// Fills `num_areas` parallel areas of `per_area` extents each,
/// independently. Returns the total number of extents actually allocated.
pub(crate) fn allocate_simple<H: Copy + PartialEq>(
    request: &mut Request<H>,
    num_areas: usize,
    per_area: u64,
    allocated: &mut [Vec<Segment<H>>],
) -> u64 {
    let ctx = PolicyContext {
        policy: request.alloc,
        can_split: request.flags.can_split,
        parallel_areas: &request.parallel_areas,
        tag_list: &request.cling_tag_list,
        maximise_cling: request.flags.maximise_cling,
    };

    let mut used_source_handles: Vec<H> = Vec::new();
    let mut total_allocated = 0u64;

    for area_index in 0..num_areas {
        let mut needed = per_area;
        let mut first_source_handle: Option<H> = None;

        while needed > 0 {
            let Some(mut candidate) = find_area(&request.sources, needed, &ctx) else {
                break;
            };

            if request.flags.parallel_areas_separate {
                let candidate_handle = request.sources[candidate.source_idx].handle();
                if used_source_handles.contains(&candidate_handle) {
                    let saved = request.sources[candidate.source_idx].area_mut(candidate.area_idx);
                    let saved_unreserved = saved.unreserved();
                    saved.set_unreserved(0);

                    let retried = find_area(&request.sources, needed, &ctx);

                    if saved_unreserved > 0 {
                        request.sources[candidate.source_idx]
                            .area_mut(candidate.area_idx)
                            .set_unreserved(saved_unreserved);
                    }

                    match retried {
                        Some(c) => candidate = c,
                        None => break,
                    }
                }
            }

            let source = &mut request.sources[candidate.source_idx];
            let source_handle = source.handle();
            let area = source.area_mut(candidate.area_idx);
            let to_take = needed.min(area.count());
            let start = area.take(to_take);
            let segment_handle = area.source_handle();

            trace!(
                "simple[{area_index}]: took {to_take} extents at {start} from source index {}",
                candidate.source_idx
            );

            allocated[area_index].push(Segment {
                source_handle: segment_handle,
                start_extent: start,
                extent_count: to_take,
            });

            needed -= to_take;
            total_allocated += to_take;
            first_source_handle.get_or_insert(source_handle);
        }

        if let Some(handle) = first_source_handle {
            used_source_handles.push(handle);
        }
    }

    total_allocated
}
