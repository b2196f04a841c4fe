//! 分段下载：拉取单个分段并写入它在文件中的偏移。

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::internal::downloader::structs::{FetchCause, FetchError, Segment, SegmentProgress};
use crate::internal::downloader::traits::download::Downloader;

use super::destination::open_segment_writer;

/// 所有分段任务共享的只读上下文。
pub(crate) struct FetchContext {
    pub downloader: Arc<dyn Downloader>,
    pub url: String,
    pub path: PathBuf,
    pub ranged: bool,
    pub total_size: Option<u64>,
    pub progress_tx: mpsc::Sender<SegmentProgress>,
}

impl FetchContext {
    /// 该分段应收的字节数：Range 下载取分段长度，整体下载取总大小（可能未知）。
    fn expected_len(&self, segment: &Segment) -> Option<u64> {
        if self.ranged {
            segment.len()
        } else {
            self.total_size
        }
    }
}

/// 拉取一个分段：请求、逐块写入 `[start, end]`、每写一块上报一次进度。
///
/// 成功时返回分段序号。
pub(crate) async fn fetch_segment(
    ctx: Arc<FetchContext>,
    segment: Segment,
) -> Result<usize, FetchError> {
    fetch_into_file(&ctx, &segment)
        .await
        .map(|()| segment.index)
        .map_err(|cause| FetchError::new(segment.index, cause))
}

async fn fetch_into_file(ctx: &FetchContext, segment: &Segment) -> Result<(), FetchCause> {
    let expected = ctx.expected_len(segment);
    let mut stream = ctx.downloader.fetch(&ctx.url, segment, ctx.ranged).await?;
    let mut file = open_segment_writer(&ctx.path, segment.start).await?;
    let mut fetched: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }
        let len = chunk.len() as u64;
        if let Some(expected) = expected {
            if fetched + len > expected {
                return Err(FetchCause::Overrun { expected });
            }
        }

        file.write_all(&chunk).await?;
        fetched += len;
        trace!(index = segment.index, fetched, "segment chunk written");

        let update = SegmentProgress {
            index: segment.index,
            bytes_fetched: fetched,
        };
        if ctx.progress_tx.send(update).await.is_err() {
            // 编排任务已退出，不再继续写
            break;
        }
    }

    file.flush().await?;

    if let Some(expected) = expected {
        if fetched < expected {
            return Err(FetchCause::Incomplete {
                expected,
                received: fetched,
            });
        }
    }

    debug!(index = segment.index, fetched, "segment finished");
    Ok(())
}
