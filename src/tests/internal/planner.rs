//! 分段规划测试：覆盖整个区间、不重叠、段数与并发无关、退化为单段。

use rand::Rng;

use crate::downloader::{ProbeResult, Segment, plan_ranges, plan_segments};

fn probe(total_size: Option<u64>, accepts_ranges: bool) -> ProbeResult {
    ProbeResult {
        total_size,
        accepts_ranges,
        ..Default::default()
    }
}

fn assert_partition(segments: &[Segment], total: u64) {
    let mut next = 0;
    for (i, s) in segments.iter().enumerate() {
        assert_eq!(s.index, i);
        assert_eq!(s.start, next, "分段 {i} 不连续");
        let end = s.end.expect("Range 分段必须有上界");
        assert!(end >= s.start);
        next = end + 1;
    }
    assert_eq!(next, total, "分段没有覆盖整个区间");
}

#[test]
fn ten_million_by_four_million_is_three_segments() {
    let segments = plan_ranges(10_000_000, 4_000_000);
    assert_eq!(
        segments,
        vec![
            Segment { index: 0, start: 0, end: Some(3_999_999) },
            Segment { index: 1, start: 4_000_000, end: Some(7_999_999) },
            Segment { index: 2, start: 8_000_000, end: Some(9_999_999) },
        ]
    );
}

#[test]
fn exact_multiple_has_no_trailing_segment() {
    let segments = plan_ranges(8_000_000, 4_000_000);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1].end, Some(7_999_999));
}

#[test]
fn total_smaller_than_segment_is_one_segment() {
    let segments = plan_ranges(10, 4_000_000);
    assert_eq!(segments, vec![Segment { index: 0, start: 0, end: Some(9) }]);
    assert_eq!(segments[0].len(), Some(10));
    assert_eq!(segments[0].range_header(), "bytes=0-9");
}

#[test]
fn random_totals_are_fully_covered() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let total = rng.gen_range(1..50_000_000u64);
        let size = rng.gen_range(1_048_577..8_000_000u64);
        let segments = plan_ranges(total, size);
        assert_eq!(segments.len() as u64, total.div_ceil(size));
        assert_partition(&segments, total);
        let lens: u64 = segments.iter().filter_map(Segment::len).sum();
        assert_eq!(lens, total);
    }
}

#[test]
fn segment_count_does_not_depend_on_concurrency() {
    let plan = plan_segments(&probe(Some(10_000_000), true), 2_000_000);
    assert_eq!(plan.len(), 5);
    assert!(plan.ranged);
    assert_eq!(plan.effective_concurrency(2), 2);
    assert_eq!(plan.effective_concurrency(16), 5);
}

#[test]
fn zero_length_ranged_resource_has_no_segments() {
    let plan = plan_segments(&probe(Some(0), true), 2_000_000);
    assert!(plan.is_empty());
    assert!(plan.ranged);
    assert_eq!(plan.total_size, Some(0));
}

#[test]
fn no_range_support_falls_back_to_one_segment() {
    let plan = plan_segments(&probe(Some(12_345), false), 2_000_000);
    assert!(!plan.ranged);
    assert_eq!(plan.segments, vec![Segment { index: 0, start: 0, end: Some(12_344) }]);
    assert_eq!(plan.effective_concurrency(8), 1);
}

#[test]
fn unknown_size_is_one_open_segment() {
    let plan = plan_segments(&probe(None, true), 2_000_000);
    assert!(!plan.ranged);
    assert_eq!(plan.total_size, None);
    assert_eq!(plan.segments, vec![Segment { index: 0, start: 0, end: None }]);
    assert_eq!(plan.segments[0].len(), None);
    assert_eq!(plan.segments[0].range_header(), "bytes=0-");
}

#[test]
fn empty_unranged_resource_is_one_open_segment() {
    let plan = plan_segments(&probe(Some(0), false), 2_000_000);
    assert_eq!(plan.segments, vec![Segment { index: 0, start: 0, end: None }]);
}
