use crate::internal::downloader::structs::ConfigError;

use super::task::Task;
use super::task_config::{DEFAULT_MAX_CONCURRENCY, DEFAULT_SEGMENT_SIZE, MIN_SEGMENT_SIZE};

/// 绑定到单次下载调用的派生配置；只能通过 [`TaskInfo::new`] 构造，构造即校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    task: Task,
    max_concurrency: usize,
    segment_size: u64,
}

impl TaskInfo {
    /// 校验配置并构造。
    ///
    /// - `segment_size` 必须严格大于 [`MIN_SEGMENT_SIZE`]（1 MiB）；
    /// - `max_concurrency` 至少为 1；
    /// - `task.url` 不能为空。
    ///
    /// 校验发生在任何网络或文件 I/O 之前。
    pub fn new(task: Task, max_concurrency: usize, segment_size: u64) -> Result<Self, ConfigError> {
        if task.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if segment_size <= MIN_SEGMENT_SIZE {
            return Err(ConfigError::SegmentSizeTooSmall {
                segment_size,
                min: MIN_SEGMENT_SIZE,
            });
        }
        if max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(Self {
            task,
            max_concurrency,
            segment_size,
        })
    }

    /// 使用默认并发数与分段大小。
    pub fn with_defaults(task: Task) -> Result<Self, ConfigError> {
        Self::new(task, DEFAULT_MAX_CONCURRENCY, DEFAULT_SEGMENT_SIZE)
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn url(&self) -> &str {
        &self.task.url
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn segment_size(&self) -> u64 {
        self.segment_size
    }
}
