use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::internal::downloader::traits::download::Downloader;
use crate::internal::task::structs::{DownloadOptions, Task, TaskInfo};

use super::download_error::{ConfigError, DownloadError};
use super::http_downloader::HttpDownloader;
use super::progress_stream::ProgressStream;
use super::segmented_download::DownloadJob;

/// 一次下载调用的构建器。
///
/// ```ignore
/// let mut stream = DownloadRequest::new("https://example.com/a.bin", "/tmp")
///     .max_concurrency(4)
///     .start();
/// while let Some(progress) = stream.next().await {
///     println!("{}", progress?);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    task: Task,
    options: DownloadOptions,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, save_path: impl Into<PathBuf>) -> Self {
        Self::from_task(Task::with_dir(url, save_path))
    }

    pub fn from_task(task: Task) -> Self {
        Self::from_options(task, DownloadOptions::default())
    }

    pub fn from_options(task: Task, options: DownloadOptions) -> Self {
        Self { task, options }
    }

    pub fn save_name(mut self, save_name: impl Into<String>) -> Self {
        self.task.save_name = save_name.into();
        self
    }

    /// 追加一个探测请求头；同名时覆盖。
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.insert(name.into(), value.into());
        self
    }

    /// 整体替换探测请求头，包括默认的 `Range: bytes=0-0`。
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.options.headers = headers;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.options.max_concurrency = max_concurrency;
        self
    }

    pub fn segment_size(mut self, segment_size: u64) -> Self {
        self.options.segment_size = segment_size;
        self
    }

    /// 开始前删除已存在的目标文件。
    pub fn clear_cache(mut self, clear_cache: bool) -> Self {
        self.options.clear_cache = clear_cache;
        self
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// 校验配置，得到本次下载的 [`TaskInfo`]。不做任何 I/O。
    pub fn task_info(&self) -> Result<TaskInfo, ConfigError> {
        TaskInfo::new(
            self.task.clone(),
            self.options.max_concurrency,
            self.options.segment_size,
        )
    }

    /// 使用默认的 [`HttpDownloader`] 开始下载。
    pub fn start(self) -> ProgressStream {
        match HttpDownloader::new() {
            Ok(downloader) => self.start_with(Arc::new(downloader)),
            Err(e) => ProgressStream::rejected(DownloadError::Config(e)),
        }
    }

    /// 使用指定的下载实现开始下载。
    ///
    /// 配置在这里同步校验；不合法时返回的流只产出一个
    /// [`DownloadError::Config`]，不会发出任何请求。
    pub fn start_with(self, downloader: Arc<dyn Downloader>) -> ProgressStream {
        let task_info = match self.task_info() {
            Ok(task_info) => task_info,
            Err(e) => return ProgressStream::rejected(DownloadError::Config(e)),
        };
        ProgressStream::launch(DownloadJob {
            task_info,
            headers: self.options.headers,
            clear_cache: self.options.clear_cache,
            downloader,
        })
    }
}
