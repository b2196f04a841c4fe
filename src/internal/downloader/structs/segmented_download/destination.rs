//! 分段下载：目标文件的准备与每个分段独立的写句柄。

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncSeekExt;
use tracing::debug;

use crate::internal::downloader::structs::DownloadError;

/// 在任何分段写入之前准备目标文件。
///
/// - `clear_cache` 时先删除已存在的文件；
/// - 创建缺失的父目录；
/// - 已知总大小时预分配到该长度，已有的部分内容保留、之后被分段覆盖；
/// - 大小未知时截断为空，由单段顺序写入。
pub(crate) async fn prepare_destination(
    path: &Path,
    total_size: Option<u64>,
    clear_cache: bool,
) -> Result<(), DownloadError> {
    let prepare_err = |source| DownloadError::PrepareFile {
        path: path.to_path_buf(),
        source,
    };

    if clear_cache && fs::try_exists(path).await.map_err(prepare_err)? {
        debug!(path = %path.display(), "clear cache: removing existing file");
        fs::remove_file(path).await.map_err(prepare_err)?;
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(prepare_err)?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .map_err(prepare_err)?;
    file.set_len(total_size.unwrap_or(0))
        .await
        .map_err(prepare_err)?;
    file.sync_all().await.map_err(prepare_err)?;

    Ok(())
}

/// 为一个分段单独打开写句柄并定位到 `offset`。
///
/// 每个分段各自持有一个打开的文件描述，游标互不影响，分段间不需要加锁。
pub(crate) async fn open_segment_writer(path: &Path, offset: u64) -> std::io::Result<File> {
    let mut file = OpenOptions::new().write(true).open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    Ok(file)
}
