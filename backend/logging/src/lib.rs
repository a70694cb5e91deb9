//! Structured logging for Spamshot.
//!
//! Console and rolling JSON file output, plus redaction of phone numbers and
//! bot tokens in logged user content.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
