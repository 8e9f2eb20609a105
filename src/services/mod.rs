pub mod archiver;
pub mod form_submitter;
pub mod part_resolver;
pub mod receipt_exporter;

pub use archiver::{ArchiveSummary, ReceiptArchiver};
pub use form_submitter::{FormSubmitter, RetryPolicy};
pub use part_resolver::PartNumberResolver;
pub use receipt_exporter::ReceiptExporter;
