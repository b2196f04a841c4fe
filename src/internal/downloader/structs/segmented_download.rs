mod destination;
mod fetch_segment;
mod orchestrator;
mod planner;

pub(crate) use orchestrator::{DownloadJob, JobReporter, run_segmented_download};
pub use planner::{plan_ranges, plan_segments};
