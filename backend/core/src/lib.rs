pub mod error;
pub mod traits;
pub mod types;

pub use error::SpamshotError;
pub use traits::{FetchedImage, ImageSource, OcrEngine, PhoneCanonicalizer, ProgressNotifier, SpamStore};
pub use types::{
    ExtractionResult, FileRef, OcrOutput, OcrToken, ReceivedMessage, SpammerMessage, Submitter,
};
