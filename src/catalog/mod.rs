mod document;
mod ingest;

pub use document::{AssetDescriptor, ModuleDescriptor, ModuleFileDescriptor};
pub use ingest::{IngestSummary, ingest};
