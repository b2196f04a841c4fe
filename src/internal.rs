pub mod downloader;
pub mod states;
pub mod task;
