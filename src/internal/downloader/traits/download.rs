//! 下载能力接口：探测与分段拉取。
//!
//! 编排逻辑只依赖这一个接口；默认实现为基于 reqwest 的
//! [`HttpDownloader`](crate::downloader::HttpDownloader)，也可以替换成任意自定义实现。

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

use crate::internal::downloader::structs::{FetchCause, ProbeError, ProbeResult, Segment};

/// 分段响应体：按到达顺序产出的字节块。
pub type ByteStream = BoxStream<'static, Result<Bytes, FetchCause>>;

#[async_trait]
pub trait Downloader: Send + Sync {
    /// 发起一次探测请求，得到总大小与是否支持 Range。
    ///
    /// 探测请求的响应体不应被读取。
    async fn probe(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ProbeResult, ProbeError>;

    /// 拉取一个分段。`ranged` 为 `true` 时请求 `[start, end]`，否则请求整个资源。
    ///
    /// 实现必须保证 Range 请求得到的字节恰好从 `segment.start` 开始。
    async fn fetch(
        &self,
        url: &str,
        segment: &Segment,
        ranged: bool,
    ) -> Result<ByteStream, FetchCause>;
}
