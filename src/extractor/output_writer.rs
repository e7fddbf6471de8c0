use crate::config::OutputConfig;
use crate::error::{HtmlTxtError, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// Writes extracted text to the path the user picked.
pub struct OutputWriter {
    default_extension: String,
    force_overwrite: bool,
}

impl OutputWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            default_extension: config.default_extension.clone(),
            force_overwrite: config.force_overwrite,
        }
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    /// Appends the default extension when the chosen path has none.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(&self.default_extension)
        }
    }

    /// Saves `content` as UTF-8 and returns the path actually written.
    pub fn save(&self, content: &str, path: &Path) -> Result<PathBuf> {
        let dest = self.resolve_path(path);
        self.validate_destination_path(&dest)?;

        if dest.exists() && !self.force_overwrite {
            return Err(HtmlTxtError::OutputExists {
                path: dest.display().to_string(),
            });
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = fs::File::create(&dest).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => HtmlTxtError::Permission {
                path: dest.display().to_string(),
            },
            _ => HtmlTxtError::Io(e),
        })?;

        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;

        log::info!("Wrote {} bytes to {}", content.len(), dest.display());
        Ok(dest)
    }

    /// Like [`OutputWriter::save`], but an absent path means the user
    /// cancelled and nothing is written.
    pub fn save_to(&self, content: &str, path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => self.save(content, path),
            None => Err(HtmlTxtError::SaveCancelled),
        }
    }

    fn validate_destination_path(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(HtmlTxtError::InvalidPath {
                path: "empty output path".to_string(),
            });
        }

        if path.is_dir() {
            return Err(HtmlTxtError::InvalidPath {
                path: format!("{} is a directory", path.display()),
            });
        }

        if path
            .file_name()
            .is_none_or(|name| name.to_string_lossy().trim().is_empty())
            || path.components().last() == Some(Component::ParentDir)
        {
            return Err(HtmlTxtError::InvalidPath {
                path: format!("{} does not name a file", path.display()),
            });
        }

        Ok(())
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_path_appends_txt() {
        let writer = OutputWriter::default();
        assert_eq!(
            writer.resolve_path(Path::new("out/combined")),
            PathBuf::from("out/combined.txt")
        );
        assert_eq!(
            writer.resolve_path(Path::new("notes.md")),
            PathBuf::from("notes.md")
        );
    }

    #[test]
    fn test_save_writes_content() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::default();

        let written = writer.save("T\n\nBody\n", &dir.path().join("result")).unwrap();

        assert_eq!(written, dir.path().join("result.txt"));
        assert_eq!(fs::read_to_string(&written).unwrap(), "T\n\nBody\n");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a").join("b").join("out.txt");

        OutputWriter::default().save("x", &target).unwrap();
        assert!(target.exists());
    }

    #[test]
    fn test_save_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, "old").unwrap();

        let result = OutputWriter::default().save("new", &target);
        assert!(matches!(result, Err(HtmlTxtError::OutputExists { .. })));
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");

        OutputWriter::default()
            .with_force_overwrite(true)
            .save("new", &target)
            .unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_missing_path_is_cancellation() {
        let result = OutputWriter::default().save_to("text", None);
        assert!(matches!(result, Err(HtmlTxtError::SaveCancelled)));
    }

    #[test]
    fn test_directory_target_rejected() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("folder.d");
        fs::create_dir(&sub).unwrap();

        let result = OutputWriter::default().save("x", &sub);
        assert!(matches!(result, Err(HtmlTxtError::InvalidPath { .. })));
    }
}
