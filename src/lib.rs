pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{BatchConfig, CliOverrides, Config, ExtractConfig, FilterConfig, OutputConfig};
pub use error::{FailureKind, FileFailure, HtmlTxtError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    BatchReport, BatchRunner, BlockKind, ExtractedText, FileOutcome, OutputWriter,
    ProgressCallback, TextBlock, TextExtractor, DOCUMENT_SEPARATOR,
};
pub use scanner::{DocumentFile, DocumentScanner, FileFilter, ScanStatistics};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main library interface for htmltxt functionality
pub struct HtmlTxt {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl HtmlTxt {
    /// Create a new HtmlTxt instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_formatter(config, OutputFormatter::new(output_mode, verbose, quiet), quiet)
    }

    pub fn with_formatter(config: Config, output_formatter: OutputFormatter, quiet: bool) -> Self {
        Self {
            config,
            output_formatter,
            progress_manager: ProgressManager::new(!quiet),
        }
    }

    /// Create HtmlTxt instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        let formatter = OutputFormatter::new(output_mode, cli_args.verbose, cli_args.quiet)
            .with_stderr(cli_args.stdout);

        Ok(Self::with_formatter(config, formatter, cli_args.quiet))
    }

    fn text_extractor(&self) -> TextExtractor {
        TextExtractor::new().with_dedupe_nested(self.config.extract.dedupe_nested)
    }

    /// Scan for markup files in a folder
    pub fn scan_folder(&self, folder: &Path) -> Result<Vec<DocumentFile>> {
        self.output_formatter
            .start_operation("Scanning for HTML files");

        let spinner = self
            .progress_manager
            .create_spinner(&format!("Scanning {}", folder.display()));
        let scanner = DocumentScanner::new(&self.config.filters);
        let scanned = scanner.scan_directory(folder);
        spinner.finish_and_clear();
        let documents = scanned?;

        let stats = scanner.get_statistics(&documents);
        self.output_formatter.debug(&stats.display_summary());

        Ok(documents)
    }

    /// Extract and combine the text of every markup file in a folder
    pub async fn extract_folder(&self, folder: &Path) -> Result<BatchReport> {
        let documents = self.scan_folder(folder)?;
        self.output_formatter
            .info(&format!("Found {} HTML files", documents.len()));

        let paths: Vec<PathBuf> = documents.into_iter().map(|d| d.source_path).collect();
        let report = self.run_batch(&paths).await?;

        self.output_formatter.print_batch_summary(&report);
        self.output_formatter.print_failures(&report);

        Ok(report)
    }

    /// Run the batch over an explicit list of files
    pub async fn run_batch(&self, paths: &[PathBuf]) -> Result<BatchReport> {
        self.output_formatter.start_operation("Extracting text");

        let file_progress = self.progress_manager.create_file_progress(paths.len() as u64);
        let progress_callback: ProgressCallback = {
            let pb = file_progress.clone();
            Arc::new(move |outcome: &FileOutcome| {
                ui::progress::update_batch_progress(&pb, outcome);
            })
        };

        let runner = BatchRunner::new(self.text_extractor())
            .with_max_workers(self.config.batch.max_workers);
        let report = runner.run(paths, Some(progress_callback)).await?;

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Extracted {} of {} files", report.succeeded(), report.len()),
            report.duration,
        );

        Ok(report)
    }

    /// Extract a single file. Unlike batch mode, failures are returned.
    pub fn extract_file(&self, path: &Path) -> Result<ExtractedText> {
        if !path.is_file() {
            return Err(HtmlTxtError::InvalidPath {
                path: format!("{} is not a file", path.display()),
            });
        }

        let size = std::fs::metadata(path)?.len();
        if size > self.config.filters.max_file_size {
            return Err(HtmlTxtError::FileTooLarge {
                size,
                max_size: self.config.filters.max_file_size,
            });
        }

        let (text, _) = self.text_extractor().extract_file(path)?;
        self.output_formatter
            .info(&format!("Extracted text from {}", path.display()));

        Ok(text)
    }

    /// Save text to the chosen path; `None` is a cancelled save.
    pub fn save_output(&self, content: &str, path: Option<&Path>) -> Result<PathBuf> {
        let writer = OutputWriter::new(&self.config.output);
        let written = writer.save_to(content, path)?;

        self.output_formatter
            .success(&format!("File saved successfully at {}", written.display()));

        Ok(written)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &HtmlTxtError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Extract structured text from an HTML string with default settings.
pub fn extract_html(markup: &str) -> String {
    TextExtractor::new().extract_str(markup).render()
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
