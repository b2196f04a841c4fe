//! 默认 HTTP 实现测试：用 wiremock 模拟支持 / 不支持 Range 的服务器。

use std::collections::HashMap;
use std::sync::Arc;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::DownloadRequest;
use crate::downloader::{DownloadError, Downloader, FetchCause, HttpDownloader, ProbeError};
use crate::task::range_check_headers;
use crate::tests::{MIB, init_tracing, random_bytes, temp_dir};

/// 按请求的 `Range` 头返回对应切片的服务器。
struct RangeResponder {
    body: Vec<u8>,
}

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let total = self.body.len();
        let range = request
            .headers
            .get("range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("bytes="))
            .and_then(|v| v.split_once('-'));
        let Some((start, end)) = range else {
            return ResponseTemplate::new(200).set_body_bytes(self.body.clone());
        };
        let start: usize = start.parse().unwrap();
        let end: usize = if end.is_empty() {
            total - 1
        } else {
            end.parse::<usize>().unwrap().min(total - 1)
        };
        ResponseTemplate::new(206)
            .insert_header("Content-Range", format!("bytes {start}-{end}/{total}").as_str())
            .set_body_bytes(self.body[start..=end].to_vec())
    }
}

async fn mount_range_probe(server: &MockServer, total: usize) {
    Mock::given(method("GET"))
        .and(header("range", "bytes=0-0"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", format!("bytes 0-0/{total}").as_str())
                .set_body_bytes(vec![0u8]),
        )
        .with_priority(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn probe_detects_range_support() {
    let server = MockServer::start().await;
    mount_range_probe(&server, 12345).await;

    let downloader = HttpDownloader::new().unwrap();
    let probe = downloader
        .probe(&format!("{}/file.bin", server.uri()), &range_check_headers())
        .await
        .unwrap();

    assert!(probe.accepts_ranges);
    assert_eq!(probe.total_size, Some(12345));
}

#[tokio::test]
async fn probe_without_range_support() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"plain.txt\"")
                .set_body_bytes(vec![7u8; 100]),
        )
        .mount(&server)
        .await;

    let probe = HttpDownloader::new()
        .unwrap()
        .probe(&format!("{}/plain.txt", server.uri()), &range_check_headers())
        .await
        .unwrap();

    assert!(!probe.accepts_ranges);
    assert_eq!(probe.total_size, Some(100));
    assert_eq!(probe.suggested_name().as_deref(), Some("plain.txt"));
}

#[tokio::test]
async fn probe_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = HttpDownloader::new()
        .unwrap()
        .probe(&format!("{}/missing", server.uri()), &HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Status { status: 404 }));
}

#[tokio::test]
async fn probe_rejects_bad_url() {
    let err = HttpDownloader::new()
        .unwrap()
        .probe("not a url", &HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::InvalidUrl(_)));
}

#[tokio::test]
async fn probe_error_fails_the_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = temp_dir();

    let err = DownloadRequest::new(format!("{}/broken.bin", server.uri()), dir.path())
        .start_with(Arc::new(HttpDownloader::new().unwrap()))
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Probe(ProbeError::Status { status: 500 })));
    assert!(!dir.path().join("broken.bin").exists());
}

#[tokio::test]
async fn ranged_download_end_to_end() {
    init_tracing();
    let server = MockServer::start().await;
    let content = random_bytes(3 * MIB + 4321);
    Mock::given(method("GET"))
        .and(path("/data.bin"))
        .respond_with(RangeResponder {
            body: content.clone(),
        })
        .mount(&server)
        .await;
    let dir = temp_dir();

    let done = DownloadRequest::new(format!("{}/data.bin", server.uri()), dir.path())
        .max_concurrency(3)
        .segment_size(MIB as u64 + 1)
        .start_with(Arc::new(HttpDownloader::new().unwrap()))
        .wait()
        .await
        .unwrap();

    assert_eq!(done.downloaded_bytes, content.len() as u64);
    assert!(done.is_complete());
    assert_eq!(std::fs::read(dir.path().join("data.bin")).unwrap(), content);

    // 1 次探测 + 4 个分段
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
}

#[tokio::test]
async fn server_ignoring_range_is_a_fetch_error() {
    let server = MockServer::start().await;
    let total = 2 * MIB + 10;
    mount_range_probe(&server, total).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; total]))
        .mount(&server)
        .await;
    let dir = temp_dir();

    let err = DownloadRequest::new(format!("{}/ignored.bin", server.uri()), dir.path())
        .max_concurrency(1)
        .segment_size(MIB as u64 + 1)
        .start_with(Arc::new(HttpDownloader::new().unwrap()))
        .wait()
        .await
        .unwrap_err();

    assert_eq!(err.segment_index(), Some(0));
    assert!(matches!(
        err,
        DownloadError::Fetch(ref e) if matches!(e.cause, FetchCause::Status { status: 200 })
    ));
}

#[tokio::test]
async fn short_segment_body_is_incomplete() {
    let server = MockServer::start().await;
    let total = 2 * MIB + 10;
    mount_range_probe(&server, total).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![1u8; 10]))
        .mount(&server)
        .await;
    let dir = temp_dir();

    let err = DownloadRequest::new(format!("{}/short.bin", server.uri()), dir.path())
        .max_concurrency(1)
        .segment_size(MIB as u64 + 1)
        .start_with(Arc::new(HttpDownloader::new().unwrap()))
        .wait()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::Fetch(ref e) if matches!(
            e.cause,
            FetchCause::Incomplete { expected, received: 10 } if expected == MIB as u64 + 1
        )
    ));
}

#[tokio::test]
async fn basic_auth_and_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .and(header("x-token", "abc"))
        .respond_with(
            ResponseTemplate::new(206).insert_header("Content-Range", "bytes 0-0/10"),
        )
        .mount(&server)
        .await;

    let downloader = HttpDownloader::builder()
        .basic_auth("user", "pass")
        .default_header("X-Token", "abc")
        .user_agent("range_dl-test")
        .build()
        .unwrap();
    let probe = downloader
        .probe(&format!("{}/secret", server.uri()), &range_check_headers())
        .await
        .unwrap();
    assert_eq!(probe.total_size, Some(10));

    let debug = format!("{downloader:?}");
    assert!(!debug.contains("dXNlcjpwYXNz"));
}
