//! The synchronized multi-area allocator: fills N parallel areas in rounds
//! of equal size so every area ends up with an identical segment layout,
//! as stripes and RAID images require.
//!
//! Runs only when more than one parallel area needs filling and splitting
//! is permitted; otherwise [`crate::simple`] handles it.

use log::{debug, trace, warn};

use crate::policy::{find_area, Candidate, PolicyContext};
use crate::request::Request;
use crate::segment::Segment;
use crate::util::scoped_zero::{hide_candidates, hide_entire_source, restore_all_zeroed, restore_snapshot};

/// Fills `num_areas` parallel areas of `per_area` extents each, in
/// synchronized rounds. Returns the total number of extents actually
/// allocated.
pub(crate) fn allocate_synchronized<H: Copy + PartialEq>(
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

    // The trailing `log_area_count` slots; `mirror_logs_separate` scopes
    // its own disjointness requirement to just these.
    let log_slot_start = (request.area_count + request.parity_count) as usize;
    let is_log_slot = |s: usize| s >= log_slot_start;

    let mut area_needed = vec![per_area; num_areas];
    // Sources each area slot has ever committed to, locked in the first
    // time that slot commits and never updated again: only the first
    // source an area touches is tracked for the disjoint-source
    // constraint (see DESIGN.md).
    let mut used_source_recorded = vec![false; num_areas];
    let mut used_source_indices: Vec<usize> = Vec::new();
    let mut total_allocated = 0u64;
    let mut round = 0u32;

    loop {
        if area_needed.iter().all(|&n| n == 0) {
            trace!("sync_rounds: all {num_areas} areas satisfied after {round} rounds");
            break;
        }

        let mut selected: Vec<Option<Candidate>> = vec![None; num_areas];
        let mut incomplete = false;

        for s in 0..num_areas {
            if area_needed[s] == 0 {
                continue;
            }

            let mut candidate = find_area(&request.sources, area_needed[s], &ctx);
            if candidate.is_none() {
                incomplete = true;
                break;
            }

            let needs_disjoint =
                request.flags.parallel_areas_separate || (request.flags.mirror_logs_separate && is_log_slot(s));

            if needs_disjoint {
                loop {
                    let Some(cand) = candidate else { break };
                    let conflict_used =
                        request.flags.parallel_areas_separate && used_source_indices.contains(&cand.source_idx);
                    let conflict_selected = selected[..s].iter().enumerate().any(|(prev_s, prev)| {
                        matches!(prev, Some(p) if p.source_idx == cand.source_idx)
                            && (request.flags.parallel_areas_separate || is_log_slot(prev_s))
                    });
                    if !conflict_used && !conflict_selected {
                        break;
                    }
                    hide_entire_source(&mut request.sources, cand.source_idx);
                    candidate = find_area(&request.sources, area_needed[s], &ctx);
                }
                restore_all_zeroed(&mut request.sources);

                if candidate.is_none() {
                    warn!("sync_rounds: redundancy constraint unsatisfiable for area {s} in round {round}");
                    incomplete = true;
                    break;
                }
            }

            let mut candidate = candidate.unwrap();
            let already_selected: Vec<Candidate> = selected[..s].iter().flatten().copied().collect();
            if already_selected.contains(&candidate) {
                let snapshot = hide_candidates(&mut request.sources, &already_selected);
                let retried = find_area(&request.sources, area_needed[s], &ctx);
                restore_snapshot(&mut request.sources, &already_selected, &snapshot);
                match retried {
                    Some(c) => candidate = c,
                    None => {
                        incomplete = true;
                        break;
                    }
                }
            }

            selected[s] = Some(candidate);
        }

        if incomplete {
            break;
        }

        let round_size = selected
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.map(|c| (s, c)))
            .map(|(s, c)| {
                let area = &request.sources[c.source_idx].areas()[c.area_idx];
                area.count().min(area_needed[s])
            })
            .min();

        let round_size = match round_size {
            Some(size) if size > 0 => size,
            _ => break,
        };

        for (s, candidate) in selected.into_iter().enumerate() {
            let Some(candidate) = candidate else { continue };
            let area = request.sources[candidate.source_idx].area_mut(candidate.area_idx);
            let start = area.take(round_size);
            let segment_handle = area.source_handle();

            allocated[s].push(Segment {
                source_handle: segment_handle,
                start_extent: start,
                extent_count: round_size,
            });
            area_needed[s] -= round_size;
            total_allocated += round_size;

            if request.flags.parallel_areas_separate && !used_source_recorded[s] {
                used_source_indices.push(candidate.source_idx);
                used_source_recorded[s] = true;
            }
        }

        round += 1;
        debug!("sync_rounds: committed round {round} of size {round_size}");
    }

    total_allocated
}
