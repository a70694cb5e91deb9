pub mod pipeline;
pub mod progress;

pub use pipeline::{ScanReport, ScreenshotPipeline, ScreenshotRequest, ScreenshotSubmission};
