//! Single-worker submission queue for screenshot runs.

pub mod queue;

pub use queue::{Admission, Submission, SubmissionHandler, SubmissionQueue};
