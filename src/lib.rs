/// 内部实现模块
mod internal;


/// 下载入口：构建请求、开始下载、读取进度流
pub use internal::downloader::structs::{DownloadRequest, ProgressStream};

/// 下载任务与选项
pub mod task {
    use crate::internal;
    pub use internal::task::structs::*;
}

/// 分段下载：探测、规划、拉取与进度。
///
/// 自定义传输层时实现 [`Downloader`](downloader::Downloader) 即可，编排逻辑不变。
pub mod downloader {
    use crate::internal;
    // 类型与默认实现
    pub use internal::downloader::structs::*;
    // 传输层接口
    pub use internal::downloader::traits::download::*;
}

pub mod states {
    pub mod reactive_core {
        use crate::internal;
        pub use internal::states::reactive_core::*;
    }
}
