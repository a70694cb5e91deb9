//! Screenshot understanding: OCR token tables in, sender and body out.

pub mod extract;
pub mod normalize;
pub mod ocr;
pub mod phone;
pub mod quality;
pub mod tsv;

pub use extract::{extract_raw, ExtractionSettings, Extractor, DEFAULT_MIN_CONFIDENCE};
pub use normalize::reconstruct_lines;
pub use ocr::{TesseractEngine, TesseractOptions};
pub use phone::{
    collect_numbers, find_phone_numbers, locate_sender, PhilippineCanonicalizer, SenderMatch,
    DEFAULT_SEARCH_WINDOW,
};
pub use quality::{filter_noise, is_legible};
pub use tsv::parse_tsv;
