pub mod file;
pub mod http;
pub mod tesseract;
pub mod util;

// Re-export the cache so providers can share one instance
pub use crate::core::cache::Cache;
pub use file::{FileHistoryProvider, FileSnapshotProvider};
pub use http::{HttpHistoryProvider, HttpSnapshotProvider};
pub use tesseract::TesseractRecognizer;
