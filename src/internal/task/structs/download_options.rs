use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::task_config::{DEFAULT_MAX_CONCURRENCY, DEFAULT_SEGMENT_SIZE, range_check_headers};

/// 可序列化的下载选项，方便调用方从自己的配置文件读取。
///
/// 缺省字段取默认值；是否合法在构造 [`TaskInfo`](super::TaskInfo) 时才校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadOptions {
    /// 探测请求携带的请求头
    pub headers: HashMap<String, String>,
    /// 最大并发分段数
    pub max_concurrency: usize,
    /// 每个分段的字节数
    pub segment_size: u64,
    /// 开始前删除已存在的目标文件
    pub clear_cache: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            headers: range_check_headers(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            segment_size: DEFAULT_SEGMENT_SIZE,
            clear_cache: false,
        }
    }
}
