use std::fmt;

/// 下载进度：所有分段已写入字节数之和。
///
/// `downloaded_bytes` 只增不减；总大小已知时不会超过 `total_bytes`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// 已下载的字节数
    pub downloaded_bytes: u64,
    /// 总字节数，未知时为 `None`
    pub total_bytes: Option<u64>,
}

impl Progress {
    pub fn new(downloaded_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            downloaded_bytes,
            total_bytes,
        }
    }

    /// 进度百分比（0～100）；总大小为 0 或未知时返回 `f64::NAN`。
    pub fn percent(&self) -> f64 {
        self.total_bytes
            .filter(|&t| t > 0)
            .map(|t| (self.downloaded_bytes as f64 / t as f64) * 100.0)
            .unwrap_or(f64::NAN)
    }

    /// 总大小已知且已全部下载。
    pub fn is_complete(&self) -> bool {
        self.total_bytes == Some(self.downloaded_bytes)
    }

    /// 已下载大小的可读形式，如 `3.2 MB`。
    pub fn downloaded_size_format(&self) -> String {
        format_size(self.downloaded_bytes)
    }

    /// 总大小的可读形式；未知时为 `?`。
    pub fn total_size_format(&self) -> String {
        self.total_bytes
            .map(format_size)
            .unwrap_or_else(|| "?".to_string())
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.downloaded_size_format(),
            self.total_size_format()
        )
    }
}

/// 以 1024 为进制格式化字节数：`512 B`、`1.5 KB`、`3.2 MB`。
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
