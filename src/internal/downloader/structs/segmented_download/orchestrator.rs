//! 分段下载编排：探测 → 规划 → 有界并发拉取 → 聚合进度。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::internal::downloader::structs::{
    DownloadError, DownloadStatus, FetchError, Progress, SegmentPlan, SegmentProgress,
};
use crate::internal::downloader::traits::download::Downloader;
use crate::internal::states::reactive_core::ReactiveProperty;
use crate::internal::task::structs::TaskInfo;

use super::destination::prepare_destination;
use super::fetch_segment::{FetchContext, fetch_segment};
use super::planner::plan_segments;

/// 分段进度通道容量；满了会让分段任务在发送处等待，而不是无限排队。
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// 一次下载所需的全部输入，启动后交给编排任务独占。
pub(crate) struct DownloadJob {
    pub task_info: TaskInfo,
    pub headers: HashMap<String, String>,
    pub clear_cache: bool,
    pub downloader: Arc<dyn Downloader>,
}

/// 编排任务对外发布的状态；只有编排任务持有写端。
pub(crate) struct JobReporter {
    pub progress: ReactiveProperty<Progress>,
    pub status: ReactiveProperty<DownloadStatus>,
    pub destination: ReactiveProperty<PathBuf>,
}

type SegmentTasks = JoinSet<Result<usize, FetchError>>;

/// 执行一次完整下载，返回最终进度。
///
/// 取消令牌触发时中止所有在途分段并返回 [`DownloadError::Cancelled`]；
/// 任一分段失败时同样先中止其余分段，再返回这一个错误。
#[instrument(skip_all, fields(url = %job.task_info.url()))]
pub(crate) async fn run_segmented_download(
    job: DownloadJob,
    reporter: JobReporter,
    token: CancellationToken,
) -> Result<Progress, DownloadError> {
    reporter.status.update(DownloadStatus::Planning);

    let planned = tokio::select! {
        biased;
        _ = token.cancelled() => Err(DownloadError::Cancelled),
        planned = plan_download(&job) => planned,
    };
    let (plan, path) = match planned {
        Ok(planned) => planned,
        Err(e) => return finish(&reporter, Err(e)),
    };
    reporter.destination.update(path.clone());

    reporter.status.update(DownloadStatus::Fetching);
    let result = fetch_all(&job, plan, path, &reporter.progress, &token).await;
    finish(&reporter, result)
}

/// 规划阶段：探测、确定文件名、规划分段、准备目标文件。
async fn plan_download(job: &DownloadJob) -> Result<(SegmentPlan, PathBuf), DownloadError> {
    let task_info = &job.task_info;
    let probe = job
        .downloader
        .probe(task_info.url(), &job.headers)
        .await?;

    let path = task_info
        .task()
        .destination(probe.suggested_name().as_deref());
    let plan = plan_segments(&probe, task_info.segment_size());
    info!(
        path = %path.display(),
        total_size = ?plan.total_size,
        ranged = plan.ranged,
        segments = plan.len(),
        "download planned"
    );

    prepare_destination(&path, plan.total_size, job.clear_cache).await?;
    Ok((plan, path))
}

/// 拉取阶段：最多 `concurrency` 个分段同时在途，每完成一个补入一个。
///
/// 进度表只在本函数内修改，所有分段的上报都经过同一个通道串行处理。
async fn fetch_all(
    job: &DownloadJob,
    plan: SegmentPlan,
    path: PathBuf,
    progress: &ReactiveProperty<Progress>,
    token: &CancellationToken,
) -> Result<Progress, DownloadError> {
    let total = plan.total_size;
    let concurrency = plan.effective_concurrency(job.task_info.max_concurrency());
    let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
    let ctx = Arc::new(FetchContext {
        downloader: Arc::clone(&job.downloader),
        url: job.task_info.url().to_string(),
        path,
        ranged: plan.ranged,
        total_size: total,
        progress_tx,
    });

    let mut table = ProgressTable::new(plan.len(), total);
    progress.update(table.snapshot());

    let mut pending = plan.segments.into_iter();
    let mut tasks = SegmentTasks::new();
    for segment in pending.by_ref().take(concurrency) {
        tasks.spawn(fetch_segment(Arc::clone(&ctx), segment));
    }

    while !tasks.is_empty() {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                debug!(in_flight = tasks.len(), "download cancelled, aborting segments");
                shutdown(&mut tasks).await;
                return Err(DownloadError::Cancelled);
            }

            Some(update) = progress_rx.recv() => {
                if table.apply(update) {
                    progress.update(table.snapshot());
                }
            }

            joined = tasks.join_next() => match joined {
                Some(Ok(Ok(index))) => {
                    debug!(index, "segment completed");
                    if let Some(segment) = pending.next() {
                        tasks.spawn(fetch_segment(Arc::clone(&ctx), segment));
                    }
                }
                Some(Ok(Err(e))) => {
                    warn!(segment = e.segment_index, error = %e.cause, "segment failed, aborting download");
                    shutdown(&mut tasks).await;
                    return Err(e.into());
                }
                Some(Err(join_err)) => {
                    warn!(error = %join_err, "segment task panicked, aborting download");
                    shutdown(&mut tasks).await;
                    return Err(DownloadError::TaskJoin(join_err));
                }
                None => {}
            },
        }
    }

    // 分段任务都已结束，它们发出的进度全部在通道里
    while let Ok(update) = progress_rx.try_recv() {
        if table.apply(update) {
            progress.update(table.snapshot());
        }
    }

    Ok(table.snapshot())
}

/// 中止所有在途分段，并等到它们真正退出，之后不会再有写入。
async fn shutdown(tasks: &mut SegmentTasks) {
    tasks.abort_all();
    while tasks.join_next().await.is_some() {}
}

fn finish(
    reporter: &JobReporter,
    result: Result<Progress, DownloadError>,
) -> Result<Progress, DownloadError> {
    let status = match &result {
        Ok(_) => DownloadStatus::Completed,
        Err(DownloadError::Cancelled) => DownloadStatus::Cancelled,
        Err(_) => DownloadStatus::Failed,
    };
    match &result {
        Ok(progress) => info!(downloaded = progress.downloaded_bytes, "download completed"),
        Err(DownloadError::Cancelled) => info!("download cancelled"),
        Err(e) => warn!(error = %e, "download failed"),
    }
    reporter.status.update(status);
    result
}

/// 各分段已写入字节数的表，以及它们的和。
struct ProgressTable {
    fetched: Vec<u64>,
    downloaded: u64,
    total: Option<u64>,
}

impl ProgressTable {
    fn new(segments: usize, total: Option<u64>) -> Self {
        Self {
            fetched: vec![0; segments],
            downloaded: 0,
            total,
        }
    }

    /// 记录一次分段上报；只接受增长，返回总量是否变化。
    fn apply(&mut self, update: SegmentProgress) -> bool {
        let Some(slot) = self.fetched.get_mut(update.index) else {
            return false;
        };
        if update.bytes_fetched <= *slot {
            return false;
        }
        self.downloaded += update.bytes_fetched - *slot;
        *slot = update.bytes_fetched;
        true
    }

    fn snapshot(&self) -> Progress {
        Progress::new(self.downloaded, self.total)
    }
}
