use extent_alloc::{AllocFlags, AllocPolicy, AllocationHandle, Request, Source};

fn sources_with_sizes(sizes: &[u64]) -> Vec<Source<u32>> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let mut s = Source::new(i as u32);
            s.add_area(0, size, i as u32);
            s
        })
        .collect()
}

#[test]
fn fragmented_simple_fill_uses_one_segment_per_source() {
    let mut request = Request::new(sources_with_sizes(&[66, 66, 66, 66]), 264, AllocPolicy::Normal);
    request.flags.can_split = true;

    let result = AllocationHandle::new().allocate(&mut request).unwrap();

    assert_eq!(result.total_extents, 264);
    assert_eq!(result.allocated.len(), 1);
    assert_eq!(result.allocated[0].len(), 4);
    for seg in &result.allocated[0] {
        assert_eq!(seg.extent_count, 66);
    }
}

#[test]
fn striped_synchronized_fragmentation_matches_segment_by_segment() {
    let mut request = Request::new(sources_with_sizes(&[20, 38, 38, 38, 38, 38]), 192, AllocPolicy::Normal);
    request.area_count = 2;
    request.area_multiple = 2;
    request.flags.can_split = true;

    let result = AllocationHandle::new().allocate(&mut request).unwrap();

    assert_eq!(result.total_extents, 192);
    assert_eq!(result.total_area_len, 96);
    assert_eq!(result.allocated.len(), 2);

    let lens0: Vec<u64> = result.allocated[0].iter().map(|s| s.extent_count).collect();
    let lens1: Vec<u64> = result.allocated[1].iter().map(|s| s.extent_count).collect();
    assert_eq!(lens0, vec![38, 38, 20]);
    assert_eq!(lens0, lens1);
}

#[test]
fn raid10_places_each_area_on_a_distinct_source() {
    let sizes = [150_000_000u64; 4];
    let mut request = Request::new(sources_with_sizes(&sizes), 52_428_800, AllocPolicy::Normal);
    request.area_count = 4;
    request.area_multiple = 2;
    request.flags = AllocFlags {
        can_split: true,
        parallel_areas_separate: true,
        ..Default::default()
    };

    let result = AllocationHandle::new().allocate(&mut request).unwrap();

    assert_eq!(result.total_extents, 4 * 26_214_400);
    assert_eq!(result.allocated.len(), 4);

    let mut handles: Vec<u32> = result
        .allocated
        .iter()
        .map(|area| {
            assert_eq!(area.len(), 1);
            assert_eq!(area[0].extent_count, 26_214_400);
            area[0].source_handle
        })
        .collect();
    handles.sort_unstable();
    handles.dedup();
    assert_eq!(handles.len(), 4);
}

#[test]
fn redundancy_unsatisfiable_request_still_succeeds_with_nothing_allocated() {
    let mut request = Request::new(sources_with_sizes(&[100, 100]), 90, AllocPolicy::Normal);
    request.area_count = 3;
    request.area_multiple = 3;
    request.flags = AllocFlags {
        can_split: true,
        parallel_areas_separate: true,
        ..Default::default()
    };

    let result = AllocationHandle::new().allocate(&mut request).unwrap();

    assert_eq!(result.total_extents, 0);
    assert!(result.is_empty());
}

#[test]
fn contiguous_picks_the_largest_free_area() {
    let mut source = Source::new(1u32);
    source.add_area(0, 30, 1);
    source.add_area(50, 40, 1);
    source.add_area(100, 100, 1);
    let mut request = Request::new(vec![source], 80, AllocPolicy::Contiguous);

    let result = AllocationHandle::new().allocate(&mut request).unwrap();

    assert_eq!(result.total_extents, 80);
    assert_eq!(result.allocated[0].len(), 1);
    assert_eq!(result.allocated[0][0].start_extent, 100);
}

#[test]
fn six_way_approximate_stripe_is_limited_by_the_narrowest_source() {
    let mut request = Request::new(sources_with_sizes(&[20, 35, 35, 35, 35, 35]), 210, AllocPolicy::Normal);
    request.area_count = 6;
    request.area_multiple = 6;
    request.flags = AllocFlags {
        can_split: true,
        approx_alloc: true,
        ..Default::default()
    };

    let result = AllocationHandle::new().allocate(&mut request).unwrap();

    assert_eq!(result.total_extents, 120);
    assert_eq!(result.total_area_len, 20);
    assert_eq!(result.allocated.len(), 6);

    let mut handles: Vec<u32> = result
        .allocated
        .iter()
        .map(|area| {
            assert_eq!(area.len(), 1);
            assert_eq!(area[0].extent_count, 20);
            area[0].source_handle
        })
        .collect();
    handles.sort_unstable();
    handles.dedup();
    assert_eq!(handles.len(), 6);
}

#[test]
fn empty_source_list_is_rejected() {
    let mut request: Request<u32> = Request::new(Vec::new(), 10, AllocPolicy::Normal);
    assert!(AllocationHandle::new().allocate(&mut request).is_err());
}

#[test]
fn zero_extent_request_succeeds_with_empty_result() {
    let mut source = Source::new(1u32);
    source.add_area(0, 100, 1);
    let mut request = Request::new(vec![source], 0, AllocPolicy::Normal);
    let result = AllocationHandle::new().allocate(&mut request).unwrap();
    assert!(result.is_empty());
}
