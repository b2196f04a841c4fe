use core::fmt;
use std::time::Duration;

use base64::Engine;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;

use super::download_error::ConfigError;

/// 默认请求超时
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 默认最大重定向次数
const DEFAULT_MAX_REDIRECTS: usize = 10;

/// 基于 reqwest 的默认下载实现。
///
/// 由调用方显式构造后传入下载请求，没有进程级的全局实例。
/// 内部的 [`Client`] 本身是 Arc，克隆开销很小。
#[derive(Clone)]
pub struct HttpDownloader {
    pub(crate) client: Client,
}

impl HttpDownloader {
    /// 使用默认配置创建。
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    /// 复用已有的 reqwest 客户端。
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn builder() -> HttpDownloaderBuilder {
        HttpDownloaderBuilder::default()
    }
}

/// 防止 debug 泄漏认证信息
impl fmt::Debug for HttpDownloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDownloader")
            .field("client", &"<Client with hidden headers>")
            .finish()
    }
}

/// [`HttpDownloader`] 的构建器：超时、默认请求头、Basic 认证。
#[derive(Clone)]
pub struct HttpDownloaderBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    max_redirects: usize,
    headers: Vec<(String, String)>,
    basic_auth: Option<(String, String)>,
    user_agent: Option<String>,
}

impl Default for HttpDownloaderBuilder {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            headers: Vec::new(),
            basic_auth: None,
            user_agent: None,
        }
    }
}

impl HttpDownloaderBuilder {
    /// 单次请求的总超时；超时以探测错误或分段错误的形式上报。传 `None` 表示不限制。
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// 每个请求（探测与分段）都会携带的请求头，如 Cookie、Token。
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// HTTP Basic 认证。
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<HttpDownloader, ConfigError> {
        let mut headers = HeaderMap::new();

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| ConfigError::HttpClient(e.to_string()))?;
            headers.insert(name, value);
        }

        if let Some((username, password)) = &self.basic_auth {
            let token = base64::engine::general_purpose::STANDARD
                .encode(format!("{username}:{password}"));
            let mut value = HeaderValue::from_str(&format!("Basic {token}"))
                .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        if let Some(agent) = &self.user_agent {
            let value =
                HeaderValue::from_str(agent).map_err(|e| ConfigError::HttpClient(e.to_string()))?;
            headers.insert(USER_AGENT, value);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(HttpDownloader { client })
    }
}
