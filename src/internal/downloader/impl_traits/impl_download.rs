//! 默认下载实现：探测与分段拉取都走 reqwest。

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{HeaderName, HeaderValue, RANGE};
use tracing::{debug, instrument};
use url::Url;

use crate::internal::downloader::structs::{
    FetchCause, HttpDownloader, ProbeError, ProbeResult, Segment,
};
use crate::internal::downloader::traits::download::{ByteStream, Downloader};

#[async_trait]
impl Downloader for HttpDownloader {
    #[instrument(level = "debug", skip(self, headers), fields(url = %url))]
    async fn probe(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ProbeResult, ProbeError> {
        let url = Url::parse(url).map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;

        let mut request = self.client.get(url);
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProbeError::InvalidHeader(e.to_string()))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| ProbeError::InvalidHeader(e.to_string()))?;
            request = request.header(name, value);
        }

        // 只看状态码与响应头，响应体随 resp 一起丢弃
        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let response_headers = resp.headers().iter().filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|v| (k.as_str().to_string(), v.to_string()))
        });

        let result = ProbeResult::from_response(status, response_headers)?;
        debug!(
            status,
            total_size = ?result.total_size,
            accepts_ranges = result.accepts_ranges,
            "probe response"
        );
        Ok(result)
    }

    #[instrument(level = "debug", skip(self, segment), fields(url = %url, index = segment.index))]
    async fn fetch(
        &self,
        url: &str,
        segment: &Segment,
        ranged: bool,
    ) -> Result<ByteStream, FetchCause> {
        let mut request = self.client.get(url);
        if ranged {
            request = request.header(RANGE, segment.range_header());
        }

        let resp = request.send().await?;
        let status = resp.status();

        // 服务器忽略 Range 时会从 0 开始返回整个资源，写进来会覆盖别的分段
        if ranged && status != StatusCode::PARTIAL_CONTENT {
            return Err(FetchCause::Status {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchCause::Status {
                status: status.as_u16(),
            });
        }

        Ok(resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(FetchCause::from))
            .boxed())
    }
}
