//! 分段并发下载：探测、规划、有界并发拉取与进度合并。

pub mod impl_traits;
pub mod structs;
pub mod traits;
