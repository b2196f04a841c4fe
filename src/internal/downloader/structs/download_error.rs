//! 下载相关错误类型：配置、探测、分段、以及汇总到调用方的 [`DownloadError`]。

use std::path::PathBuf;

use thiserror::Error;

/// 非 reqwest 实现（自定义 [`Downloader`](crate::downloader::Downloader)）上报错误时使用的装箱错误。
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误：在任何 I/O 之前检出，不会重试。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("分段大小必须大于 {min} 字节，当前为 {segment_size}")]
    SegmentSizeTooSmall { segment_size: u64, min: u64 },

    #[error("最大并发数至少为 1")]
    ZeroConcurrency,

    #[error("下载地址为空")]
    EmptyUrl,

    #[error("HTTP 客户端配置无效: {0}")]
    HttpClient(String),
}

/// 能力探测失败；对整个下载是致命的。
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("探测请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("探测请求返回错误状态码 {status}")]
    Status { status: u16 },

    #[error("下载地址无效: {0}")]
    InvalidUrl(String),

    #[error("请求头无效: {0}")]
    InvalidHeader(String),

    #[error("探测失败: {0}")]
    Other(#[from] BoxError),
}

/// 单个分段失败的具体原因。
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("服务器返回状态码 {status}")]
    Status { status: u16 },

    #[error("数据流提前结束：应收 {expected} 字节，实收 {received} 字节")]
    Incomplete { expected: u64, received: u64 },

    #[error("服务器返回的数据超出分段范围（应收 {expected} 字节）")]
    Overrun { expected: u64 },

    #[error("写入文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] BoxError),
}

/// 分段下载失败：带上失败分段的序号。
#[derive(Debug, Error)]
#[error("分段 {segment_index} 下载失败: {cause}")]
pub struct FetchError {
    pub segment_index: usize,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(segment_index: usize, cause: impl Into<FetchCause>) -> Self {
        Self {
            segment_index,
            cause: cause.into(),
        }
    }
}

/// 一次下载对外暴露的错误。
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("准备目标文件 {} 失败: {source}", .path.display())]
    PrepareFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("分段任务异常退出: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// 调用方放弃了下载；不是失败，进度流会正常结束而不会产出该错误。
    #[error("下载被取消")]
    Cancelled,
}

impl DownloadError {
    /// 失败分段的序号（仅分段错误有）。
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            Self::Fetch(e) => Some(e.segment_index),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
