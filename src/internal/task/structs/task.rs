use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

use super::task_config::DEFAULT_SAVE_NAME;

/// 下载任务：远程地址与本地保存位置。创建后不可变，生命周期长于单次下载。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// 远程资源地址
    pub url: String,
    /// 保存目录；为空时使用系统下载目录
    pub save_path: PathBuf,
    /// 保存文件名；为空时从响应头或 URL 推导
    pub save_name: String,
}

impl Task {
    pub fn new(
        url: impl Into<String>,
        save_path: impl Into<PathBuf>,
        save_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            save_path: save_path.into(),
            save_name: save_name.into(),
        }
    }

    /// 只给出地址与目录，文件名由下载时推导。
    pub fn with_dir(url: impl Into<String>, save_path: impl Into<PathBuf>) -> Self {
        Self::new(url, save_path, String::new())
    }

    /// 实际保存目录：`save_path` 为空时回退到系统下载目录，再回退到当前目录。
    pub fn save_dir(&self) -> PathBuf {
        if !self.save_path.as_os_str().is_empty() {
            return self.save_path.clone();
        }
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// 确定最终文件名。
    ///
    /// 优先级：调用方给定的 `save_name` > 响应头建议的名字 > URL 最后一段 > [`DEFAULT_SAVE_NAME`]。
    /// 任何来源的名字都只保留最后一个路径分量，不允许逃出保存目录。
    pub fn resolve_save_name(&self, suggested: Option<&str>) -> String {
        [
            Some(self.save_name.as_str()),
            suggested,
            url_file_name(&self.url).as_deref(),
        ]
        .into_iter()
        .flatten()
        .find_map(sanitize_file_name)
        .unwrap_or_else(|| DEFAULT_SAVE_NAME.to_string())
    }

    /// 目标文件完整路径。
    pub fn destination(&self, suggested: Option<&str>) -> PathBuf {
        self.save_dir().join(self.resolve_save_name(suggested))
    }
}

/// URL 路径的最后一段（已做百分号解码）；没有可用的段时返回 `None`。
pub(crate) fn url_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.rev().find(|s| !s.is_empty())?;
    Some(percent_decode_str(last).decode_utf8_lossy().into_owned())
}

fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Path::new(last)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}
