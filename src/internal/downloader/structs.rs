pub mod download_error;
pub mod download_progress;
pub mod download_request;
pub mod download_status;
pub mod http_downloader;
pub mod probe_result;
pub mod progress_stream;
pub mod segment;
pub mod segmented_download;

// 重导出公共类型
pub use download_error::{BoxError, ConfigError, DownloadError, FetchCause, FetchError, ProbeError};
pub use download_progress::{Progress, format_size};
pub use download_request::DownloadRequest;
pub use download_status::DownloadStatus;
pub use http_downloader::{HttpDownloader, HttpDownloaderBuilder};
pub use probe_result::ProbeResult;
pub use progress_stream::ProgressStream;
pub use segment::{Segment, SegmentPlan, SegmentProgress};
pub use segmented_download::{plan_ranges, plan_segments};
