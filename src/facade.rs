//! The allocation facade: the crate's single public entry point.
//! Validates the request, dispatches to the simple or synchronized
//! allocator, and populates the result.

use log::debug;

use crate::error::AllocError;
use crate::request::Request;
use crate::segment::AllocationResult;
use crate::simple::allocate_simple;
use crate::sync_rounds::allocate_synchronized;

/// Short-lived context for one allocation call.
///
/// Carries no state of its own (see DESIGN.md for why no pooled memory
/// scope is needed here) and exists only so callers have a handle to hold
/// across one or more calls to [`AllocationHandle::allocate`] before
/// letting it drop.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllocationHandle;

impl AllocationHandle {
    /// Creates a new allocation context.
    pub fn new() -> Self {
        AllocationHandle
    }

    /// Performs one allocation call.
    ///
    /// Returns `Err` only for a malformed request: an empty source list.
    /// Insufficient space, an unsatisfiable redundancy constraint, or a
    /// zero-extent request are all successful calls that return `Ok` with
    /// a zero or partial [`AllocationResult`]; inspect `total_extents` to
    /// tell them apart from a full allocation.
    pub fn allocate<H: Copy + PartialEq>(
        &self,
        request: &mut Request<H>,
    ) -> Result<AllocationResult<H>, AllocError> {
        allocate(request)
    }
}

/// Free-function form of [`AllocationHandle::allocate`], for callers that
/// don't need to hold a handle across multiple calls.
pub fn allocate<H: Copy + PartialEq>(
    request: &mut Request<H>,
) -> Result<AllocationResult<H>, AllocError> {
    if request.sources.is_empty() {
        return Err(AllocError::EmptySourceList);
    }

    let num_areas = request.num_parallel_areas();
    let per_area = request.per_area_target();

    let mut result = AllocationResult::empty(
        request.area_count.max(1),
        request.parity_count,
        num_areas,
    );

    debug!(
        "allocate: policy={:?} num_areas={num_areas} per_area={per_area} can_split={} parallel_areas_separate={}",
        request.alloc, request.flags.can_split, request.flags.parallel_areas_separate
    );

    let total_allocated = if num_areas > 1 && request.flags.can_split {
        allocate_synchronized(request, num_areas, per_area, &mut result.allocated)
    } else {
        allocate_simple(request, num_areas, per_area, &mut result.allocated)
    };

    result.total_extents = total_allocated;
    result.total_area_len = if num_areas > 1 {
        let divisor = if request.area_multiple != 0 {
            (request.area_count + request.parity_count).max(1) as u64
        } else {
            num_areas as u64
        };
        total_allocated / divisor
    } else {
        total_allocated
    };

    Ok(result)
}
