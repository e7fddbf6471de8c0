pub mod batch_runner;
pub mod output_writer;
pub mod text_extractor;

pub use batch_runner::{BatchReport, BatchRunner, FileOutcome, ProgressCallback, DOCUMENT_SEPARATOR};
pub use output_writer::OutputWriter;
pub use text_extractor::{BlockKind, ExtractedText, TextBlock, TextExtractor};
