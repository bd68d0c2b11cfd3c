pub mod ingest;

pub use ingest::{FilePart, IngestService, UploadForm};
