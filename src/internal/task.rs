//! 下载任务描述：任务本身、单次下载的派生配置与可序列化的选项。

pub mod structs;
