use crate::error::{format_bytes, HtmlTxtError, UserFriendlyError};
use crate::extractor::BatchReport;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
    to_stderr: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
            to_stderr: false,
        }
    }

    /// Routes status messages to stderr, leaving stdout for extracted text.
    pub fn with_stderr(mut self, to_stderr: bool) -> Self {
        self.to_stderr = to_stderr;
        if to_stderr {
            self.term = Term::stderr();
            self.use_colors = self.use_colors && self.term.features().colors_supported();
        }
        self
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => self.emit(&format!("SUCCESS: {}", message)),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => self.emit(&format!("WARNING: {}", message)),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => self.emit(&format!("INFO: {}", message)),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        self.emit(&format!("  {}", style(message).dim()));
                    } else {
                        self.emit(&format!("  DEBUG: {}", message));
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => self.emit(&format!("DEBUG: {}", message)),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        self.emit(&format!("{}{}", ROCKET, style(operation).bold()));
                    } else {
                        self.emit(&format!("> {}", operation));
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => self.emit(&format!("STARTING: {}", operation)),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &HtmlTxtError) {
        let user_message = error.user_message();

        // Notices rather than failures: the user simply has nothing to do.
        match error {
            HtmlTxtError::SaveCancelled | HtmlTxtError::NoDocumentsFound { .. } => {
                self.print_notice(&user_message)
            }
            _ => self.error(&user_message),
        }

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    fn print_notice(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Warning, message),
            OutputMode::Json => self.print_json_message("warning", message),
            OutputMode::Plain => eprintln!("WARNING: {}", message),
        }
    }

    // Summary and reporting
    pub fn print_batch_summary(&self, report: &BatchReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Json => self.print_json_summary(report),
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    /// Lists the files that contributed no text.
    pub fn print_failures(&self, report: &BatchReport) {
        for (path, failure) in report.failures() {
            match self.mode {
                OutputMode::Json => self.print_json_object(&serde_json::json!({
                    "type": "file_failure",
                    "path": path.display().to_string(),
                    "kind": failure.kind,
                    "message": failure.message,
                })),
                _ => self.warning(&format!("{}: {}", path.display(), failure)),
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    self.emit(&style("─".repeat(60)).dim().to_string());
                } else {
                    self.emit(&"-".repeat(60));
                }
            }
            OutputMode::Plain => {
                self.emit(&"-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    /// Asks for a save path on an interactive terminal.
    ///
    /// Returns `None` when the answer is empty or no terminal is attached,
    /// which callers treat as a cancelled save.
    pub fn prompt_save_path(&self, suggested: &str) -> Option<PathBuf> {
        let input = Term::stdout();
        if !input.is_term() || self.mode == OutputMode::Json {
            return None;
        }

        let hint = format!("('.' for {}, empty to cancel)", suggested);
        let prompt = if self.use_colors {
            format!("{} {}: ", style("Save text file as").bold(), style(hint).dim())
        } else {
            format!("Save text file as {}: ", hint)
        };

        input.write_str(&prompt).ok()?;
        let answer = input.read_line().ok()?;
        parse_save_answer(&answer, suggested)
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn emit(&self, line: &str) {
        if self.to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        let line = if self.use_colors {
            format!("{}{}", emoji, color_fn(message))
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };
            format!("{} {}", prefix, message)
        };

        match msg_type {
            MessageType::Error | MessageType::Warning => eprintln!("{}", line),
            _ => self.emit(&line),
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        self.emit(&serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string()));
    }

    fn print_human_summary(&self, report: &BatchReport) {
        self.emit("");
        self.print_separator();

        let failed = report.len() - report.succeeded();
        if failed == 0 {
            if self.use_colors {
                self.emit(&format!(
                    "{} {}",
                    style("Text extraction completed!").green().bold(),
                    CHECKMARK
                ));
            } else {
                self.emit("✓ Text extraction completed!");
            }
        } else if self.use_colors {
            self.emit(&format!(
                "{}{}",
                WARNING,
                style("Text extraction completed with failures").yellow().bold()
            ));
        } else {
            self.emit("! Text extraction completed with failures");
        }

        self.emit("");
        self.emit(&format!(
            "  Files processed: {}",
            self.highlight(report.len().to_string())
        ));
        self.emit(&format!(
            "  Bytes read:      {}",
            self.highlight(format_bytes(report.total_bytes()))
        ));
        self.emit(&format!(
            "  Workers:         {}",
            self.highlight(report.max_workers.to_string())
        ));
        self.emit(&format!(
            "  Time taken:      {}",
            self.highlight(format_duration(report.duration))
        ));

        if failed > 0 {
            self.emit(&format!("  Failed files:    {}", failed));
        }

        self.print_separator();
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_json_summary(&self, report: &BatchReport) {
        let summary = serde_json::json!({
            "type": "summary",
            "started_at": report.started_at.to_rfc3339(),
            "files_processed": report.len(),
            "files_failed": report.len() - report.succeeded(),
            "bytes_read": report.total_bytes(),
            "max_workers": report.max_workers,
            "duration_ms": report.duration.as_millis(),
            "completion_order": report
                .outcomes()
                .iter()
                .map(|o| o.path.display().to_string())
                .collect::<Vec<_>>(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        self.emit(&serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string()));
    }

    fn print_plain_summary(&self, report: &BatchReport) {
        self.emit("COMPLETED: Text extraction");
        self.emit(&format!("Files processed: {}", report.len()));
        self.emit(&format!("Bytes read: {}", report.total_bytes()));
        self.emit(&format!("Duration: {:?}", report.duration));
        let failed = report.len() - report.succeeded();
        if failed > 0 {
            self.emit(&format!("Failed: {}", failed));
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

/// An empty answer cancels the save and `.` takes the suggested name.
fn parse_save_answer(answer: &str, suggested: &str) -> Option<PathBuf> {
    match answer.trim() {
        "" => None,
        "." => Some(PathBuf::from(suggested)),
        path => Some(PathBuf::from(path)),
    }
}
