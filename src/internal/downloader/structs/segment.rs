//! 分段模型：字节区间、分段计划与单段进度。

/// 远程资源中的一段连续字节区间，`end` 为闭区间上界。
///
/// 只有单段整体下载（大小未知或为 0）才会出现 `end == None`（开区间）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub index: usize,
    pub start: u64,
    pub end: Option<u64>,
}

impl Segment {
    /// 分段字节数；开区间时为 `None`。
    pub fn len(&self) -> Option<u64> {
        self.end.map(|end| end - self.start + 1)
    }

    /// `Range` 请求头的值：`bytes=start-end`，开区间为 `bytes=start-`。
    pub fn range_header(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// 规划结果：按偏移升序排列的分段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPlan {
    pub segments: Vec<Segment>,
    /// 是否以 Range 请求下载；为 `false` 时恰好一段、并发固定为 1
    pub ranged: bool,
    pub total_size: Option<u64>,
}

impl SegmentPlan {
    /// 实际允许同时下载的分段数。
    pub fn effective_concurrency(&self, max_concurrency: usize) -> usize {
        if self.ranged {
            max_concurrency.max(1).min(self.segments.len().max(1))
        } else {
            1
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// 单个分段已写入的字节数，只增不减，由产生它的分段任务独占。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentProgress {
    pub index: usize,
    pub bytes_fetched: u64,
}
