//! 分段规划：纯计算，不做任何 I/O。

use crate::internal::downloader::structs::{ProbeResult, Segment, SegmentPlan};

/// 将 `[0, total)` 按 `segment_size` 切成连续、不重叠的分段，最后一段承接余数。
///
/// 段数 = ceil(total / segment_size)，与并发数无关；`total == 0` 时没有分段。
pub fn plan_ranges(total: u64, segment_size: u64) -> Vec<Segment> {
    let segment_size = segment_size.max(1);
    let count = total.div_ceil(segment_size);
    (0..count)
        .map(|i| {
            let start = i * segment_size;
            let end = (start + segment_size).min(total) - 1;
            Segment {
                index: i as usize,
                start,
                end: Some(end),
            }
        })
        .collect()
}

/// 根据探测结果规划下载。
///
/// 不支持 Range 或大小未知时退化为单段整体下载（大小未知或为 0 时为开区间）。
pub fn plan_segments(probe: &ProbeResult, segment_size: u64) -> SegmentPlan {
    match probe.total_size {
        Some(total) if probe.accepts_ranges => SegmentPlan {
            segments: plan_ranges(total, segment_size),
            ranged: true,
            total_size: Some(total),
        },
        total_size => SegmentPlan {
            segments: vec![Segment {
                index: 0,
                start: 0,
                end: total_size.and_then(|t| t.checked_sub(1)),
            }],
            ranged: false,
            total_size,
        },
    }
}
