/// 下载状态（由编排任务维护，外部只读）
///
/// `Planning → Fetching → {Completed | Failed | Cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Planning,
    Fetching,
    Completed,
    Failed,
    Cancelled,
}

impl DownloadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}
