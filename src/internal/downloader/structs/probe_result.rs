//! 能力探测结果：总大小、是否支持 Range，以及原始响应头。

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use percent_encoding::percent_decode_str;

use super::download_error::ProbeError;

/// HTTP 206 Partial Content
const STATUS_PARTIAL_CONTENT: u16 = 206;

/// 一次下载只探测一次，结果不可变。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeResult {
    /// 资源总大小；未知时为 `None`
    pub total_size: Option<u64>,
    /// 服务器是否接受 Range 请求
    pub accepts_ranges: bool,
    /// 探测响应的原始响应头，键统一为小写
    pub raw_headers: HashMap<String, String>,
}

impl ProbeResult {
    /// 按状态码与响应头判定探测结果。
    ///
    /// - `206` 且 `Content-Range` 给出总大小：支持 Range，总大小取自该头；
    /// - 其他 2xx 且有 `Content-Length`：不支持 Range，只能整体单段下载；
    /// - 没有可用长度：总大小未知；
    /// - 4xx / 5xx：[`ProbeError::Status`]。
    pub fn from_response(
        status: u16,
        headers: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ProbeError> {
        if status >= 400 {
            return Err(ProbeError::Status { status });
        }

        let raw_headers: HashMap<String, String> = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();

        let (accepts_ranges, total_size) = if status == STATUS_PARTIAL_CONTENT {
            let total = raw_headers
                .get("content-range")
                .and_then(|v| parse_content_range_total(v));
            (true, total)
        } else if (200..300).contains(&status) {
            let total = raw_headers
                .get("content-length")
                .and_then(|v| v.trim().parse::<u64>().ok());
            (false, total)
        } else {
            (false, None)
        };

        Ok(Self {
            total_size,
            accepts_ranges,
            raw_headers,
        })
    }

    /// 读取某个响应头（大小写不敏感）。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw_headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// `Content-Disposition` 中建议的文件名。
    pub fn suggested_name(&self) -> Option<String> {
        self.header("content-disposition")
            .and_then(parse_content_disposition_filename)
    }

    pub fn etag(&self) -> Option<&str> {
        self.header("etag")
    }

    pub fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.header("last-modified")
            .and_then(|v| DateTime::parse_from_rfc2822(v.trim()).ok())
    }
}

/// 解析 `bytes 0-0/12345` 中的总大小；`*` 或格式错误时返回 `None`。
pub(crate) fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}

/// 解析 `Content-Disposition`，`filename*`（RFC 5987）优先于 `filename`。
pub(crate) fn parse_content_disposition_filename(disp: &str) -> Option<String> {
    let mut plain = None;
    for part in disp.split(';') {
        let Some((key, val)) = part.trim().split_once('=') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim().trim_matches('"');
        if key.eq_ignore_ascii_case("filename*") {
            let encoded = match val.split_once("''") {
                Some((_charset, rest)) => rest,
                None => val,
            };
            let decoded = percent_decode_str(encoded).decode_utf8_lossy().into_owned();
            if !decoded.is_empty() {
                return Some(decoded);
            }
        } else if key.eq_ignore_ascii_case("filename") && !val.is_empty() {
            plain = Some(val.to_string());
        }
    }
    plain
}
