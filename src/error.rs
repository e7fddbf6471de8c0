use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HtmlTxtError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is not valid UTF-8 text: {path}")]
    Decode { path: String },

    #[error("No HTML files found in {folder}")]
    NoDocumentsFound {
        folder: String,
        searched_extensions: Vec<String>,
    },

    #[error("Batch was started with no input files")]
    EmptyBatch,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Output file already exists: {path}")]
    OutputExists { path: String },

    #[error("File save operation was canceled")]
    SaveCancelled,

    #[error("Worker failed: {message}")]
    Worker { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for HtmlTxtError {
    fn user_message(&self) -> String {
        match self {
            HtmlTxtError::Decode { path } => {
                format!("Could not decode {} as UTF-8 text", path)
            }
            HtmlTxtError::NoDocumentsFound {
                folder,
                searched_extensions,
            } => {
                format!(
                    "No files with extensions {} found in {}",
                    searched_extensions.join(", "),
                    folder
                )
            }
            HtmlTxtError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            HtmlTxtError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            HtmlTxtError::FileTooLarge { size, max_size } => {
                format!(
                    "File too large: {} (maximum allowed: {})",
                    format_bytes(*size),
                    format_bytes(*max_size)
                )
            }
            HtmlTxtError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            HtmlTxtError::OutputExists { path } => {
                format!("Output file already exists: {}", path)
            }
            HtmlTxtError::SaveCancelled => "File save operation was canceled.".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            HtmlTxtError::Decode { .. } => Some(
                "Convert the file to UTF-8 first, or run on its folder to skip unreadable files.".to_string()
            ),
            HtmlTxtError::NoDocumentsFound { .. } => Some(
                "Check the folder path, try --recursive, or widen the match with --extensions (e.g., --extensions html,htm,xhtml).".to_string()
            ),
            HtmlTxtError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            HtmlTxtError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target path.".to_string()
            ),
            HtmlTxtError::FileTooLarge { .. } => Some(
                "Increase the maximum file size limit with --max-size.".to_string()
            ),
            HtmlTxtError::OutputExists { .. } => Some(
                "Choose a different path with --output, or use --force to overwrite.".to_string()
            ),
            HtmlTxtError::SaveCancelled => Some(
                "Pass --output <file> or --stdout to choose where the text goes.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for HtmlTxtError {
    fn from(error: toml::de::Error) -> Self {
        HtmlTxtError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HtmlTxtError>;

/// Broad category of a per-file failure inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Read,
    Decode,
    Worker,
}

/// Cloneable record of why one file contributed no text to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&HtmlTxtError> for FileFailure {
    fn from(error: &HtmlTxtError) -> Self {
        let kind = match error {
            HtmlTxtError::Decode { .. } => FailureKind::Decode,
            HtmlTxtError::Worker { .. } => FailureKind::Worker,
            _ => FailureKind::Read,
        };

        Self {
            kind,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
