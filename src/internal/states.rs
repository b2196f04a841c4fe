//! 响应式状态：进度合并所用的最新值属性。

pub mod reactive_core;
