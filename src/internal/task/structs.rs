pub mod download_options;
pub mod task;
pub mod task_config;
pub mod task_info;

// 重导出公共类型
pub use download_options::DownloadOptions;
pub use task::Task;
pub use task_config::{
    DEFAULT_MAX_CONCURRENCY, DEFAULT_SAVE_NAME, DEFAULT_SEGMENT_SIZE, MIN_SEGMENT_SIZE,
    RANGE_CHECK_HEADER, range_check_headers,
};
pub use task_info::TaskInfo;
