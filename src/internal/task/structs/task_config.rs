use std::collections::HashMap;

/// 1 MiB
const MIB: u64 = 1024 * 1024;

/// 分段大小下限（不含）：分段必须严格大于 1 MiB
pub const MIN_SEGMENT_SIZE: u64 = MIB;

/// 默认分段大小：5 MiB
pub const DEFAULT_SEGMENT_SIZE: u64 = 5 * MIB;

/// 默认最大并发分段数
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// 无法从响应头或 URL 推导文件名时使用的名字
pub const DEFAULT_SAVE_NAME: &str = "download";

/// 探测请求默认携带的请求头：只要 1 个字节，用于判断服务器是否支持 Range
pub const RANGE_CHECK_HEADER: (&str, &str) = ("Range", "bytes=0-0");

/// 以 map 形式返回默认探测请求头。
pub fn range_check_headers() -> HashMap<String, String> {
    HashMap::from([(
        RANGE_CHECK_HEADER.0.to_string(),
        RANGE_CHECK_HEADER.1.to_string(),
    )])
}
