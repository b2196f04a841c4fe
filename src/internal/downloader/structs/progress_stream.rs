//! 进度流：编排任务与调用方之间的合并层。
//!
//! 编排任务每次聚合都会发布一个新的 [`Progress`]，但这里只保留最新值：
//! 调用方读得慢时，中间值被直接丢弃，不会无限排队。首个和最后一个值不会丢：
//! 编排任务结束后，尚未读取的最后一个值先于结束（或错误）交付。
//!
//! 流是惰性的：第一次 poll 时才启动编排任务。丢弃流或调用 [`ProgressStream::cancel`]
//! 都会取消下载，在途分段被中止，已写入的数据保持原样。取消之后流不再交付任何进度。
//!
//! 流结束后可以继续 poll，始终返回 `None`。

use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::{self, BoxStream, Fuse, FusedStream, Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::internal::states::reactive_core::{PropertyWatcher, ReactiveProperty};

use super::download_error::DownloadError;
use super::download_progress::Progress;
use super::download_status::DownloadStatus;
use super::segmented_download::{DownloadJob, JobReporter, run_segmented_download};

/// 合并后的下载进度流，产出 `Result<Progress, DownloadError>`。
///
/// - 正常完成：最后一个进度之后流结束；
/// - 失败：恰好产出一个 `Err` 后结束；
/// - 取消：直接结束，不产出错误。
pub struct ProgressStream {
    inner: Fuse<BoxStream<'static, Result<Progress, DownloadError>>>,
    /// 已交付给调用方的最后一个进度
    last: Option<Progress>,
    status: PropertyWatcher<DownloadStatus>,
    destination: PropertyWatcher<PathBuf>,
    token: CancellationToken,
    _guard: DropGuard,
}

/// 流内部的阶段。
enum Phase {
    /// 尚未被 poll，编排任务未启动
    Idle(Box<(DownloadJob, JobReporter)>),
    Running {
        progress: PropertyWatcher<Progress>,
        handle: JoinHandle<Result<Progress, DownloadError>>,
    },
    /// 启动前就已失败（如配置错误），不做任何 I/O
    Rejected(DownloadError),
    Done,
}

impl ProgressStream {
    /// 为一次下载创建惰性进度流。
    pub(crate) fn launch(job: DownloadJob) -> Self {
        let reporter = JobReporter {
            progress: ReactiveProperty::empty(),
            status: ReactiveProperty::new(DownloadStatus::Planning),
            destination: ReactiveProperty::empty(),
        };
        let status = reporter.status.watch();
        let destination = reporter.destination.watch();
        Self::from_phase(Phase::Idle(Box::new((job, reporter))), status, destination)
    }

    /// 启动前就被拒绝的下载：只产出这一个错误。
    pub(crate) fn rejected(error: DownloadError) -> Self {
        let status = ReactiveProperty::new(DownloadStatus::Failed);
        let destination = ReactiveProperty::<PathBuf>::empty();
        let (status, destination) = (status.watch(), destination.watch());
        Self::from_phase(Phase::Rejected(error), status, destination)
    }

    fn from_phase(
        phase: Phase,
        status: PropertyWatcher<DownloadStatus>,
        destination: PropertyWatcher<PathBuf>,
    ) -> Self {
        let token = CancellationToken::new();
        let child = token.clone();
        let inner = stream::unfold((phase, child), |(phase, token)| async move {
            next_item(phase, &token)
                .await
                .map(|(item, phase)| (item, (phase, token)))
        })
        .boxed()
        .fuse();

        Self {
            inner,
            last: None,
            status,
            destination,
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    /// 当前下载状态。
    pub fn status(&self) -> DownloadStatus {
        self.status.borrow().unwrap_or(DownloadStatus::Planning)
    }

    /// 目标文件路径；规划完成前为 `None`。
    pub fn destination(&self) -> Option<PathBuf> {
        self.destination.borrow()
    }

    /// 取消下载。之后流直接结束，不会产出错误。
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 已交付的最后一个进度；尚未读到任何进度时为 `None`。
    pub fn last_progress(&self) -> Option<Progress> {
        self.last
    }

    /// 一直读到结束，返回最后一个进度（包括之前已经通过 `next()` 读过的）。
    ///
    /// 被取消时返回 [`DownloadError::Cancelled`]。
    pub async fn wait(mut self) -> Result<Progress, DownloadError> {
        while let Some(item) = self.next().await {
            item?;
        }
        match self.status() {
            DownloadStatus::Completed => Ok(self.last.unwrap_or_default()),
            _ => Err(DownloadError::Cancelled),
        }
    }
}

impl Stream for ProgressStream {
    type Item = Result<Progress, DownloadError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = this.inner.poll_next_unpin(cx);
        if let Poll::Ready(Some(Ok(progress))) = &polled {
            this.last = Some(*progress);
        }
        polled
    }
}

impl FusedStream for ProgressStream {
    fn is_terminated(&self) -> bool {
        self.inner.is_done()
    }
}

async fn next_item(
    mut phase: Phase,
    token: &CancellationToken,
) -> Option<(Result<Progress, DownloadError>, Phase)> {
    loop {
        phase = match phase {
            Phase::Idle(boxed) => {
                let (job, reporter) = *boxed;
                let progress = reporter.progress.watch();
                let handle = tokio::spawn(run_segmented_download(job, reporter, token.clone()));
                Phase::Running { progress, handle }
            }
            Phase::Rejected(error) => return Some((Err(error), Phase::Done)),
            Phase::Done => return None,
            Phase::Running {
                mut progress,
                handle,
            } => {
                let latest = tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    latest = progress.changed() => latest.ok(),
                };
                if let Some(latest) = latest.filter(|_| !token.is_cancelled()) {
                    return Some((Ok(latest), Phase::Running { progress, handle }));
                }
                // 已取消，或写端已销毁（编排任务结束且最后的进度已交付）：
                // 等编排任务退出，保证流结束时所有分段都已停止
                let outcome = handle.await;
                if token.is_cancelled() {
                    debug!("progress stream ended by cancellation");
                    return None;
                }
                return match outcome {
                    Ok(Ok(_)) => None,
                    Ok(Err(DownloadError::Cancelled)) => {
                        debug!("progress stream ended by cancellation");
                        None
                    }
                    Ok(Err(e)) => Some((Err(e), Phase::Done)),
                    Err(join_err) => Some((Err(DownloadError::TaskJoin(join_err)), Phase::Done)),
                };
            }
        };
    }
}
