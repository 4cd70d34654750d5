pub mod extractor;
pub mod http_ocr;
pub mod preprocessing;

// Re-export main types
pub use extractor::TextExtractor;
pub use http_ocr::{HttpOcrClient, RecognitionMode, TextRecognizer};
