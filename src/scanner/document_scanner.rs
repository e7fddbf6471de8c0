use crate::config::FilterConfig;
use crate::error::{format_bytes, HtmlTxtError, Result};
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub size: u64,
    pub modified: SystemTime,
}

impl DocumentFile {
    pub fn new(
        source_path: PathBuf,
        relative_path: PathBuf,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            source_path,
            relative_path,
            filename,
            extension,
            size,
            modified,
        }
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }

    pub fn format_size(&self) -> String {
        format_bytes(self.size)
    }
}

pub struct DocumentScanner {
    filter: FileFilter,
    max_depth: usize,
}

impl DocumentScanner {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
        }
    }

    /// Lists the markup files under `root`, sorted by relative path.
    ///
    /// An empty result is reported as [`HtmlTxtError::NoDocumentsFound`] so the
    /// caller never starts a batch with nothing to do.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<DocumentFile>> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(HtmlTxtError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(HtmlTxtError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut documents = Vec::new();
        let mut scan_errors = Vec::new();
        let mut permission_denied = false;

        let walker = WalkDir::new(root_path)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_traverse(e, root_path));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        permission_denied = true;
                        scan_errors.push(format!("Permission denied: {}", err));
                    } else {
                        scan_errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if entry.file_type().is_file() {
                match self.process_file(&entry, root_path) {
                    Ok(Some(doc_file)) => documents.push(doc_file),
                    Ok(None) => {}
                    Err(err) => {
                        scan_errors.push(format!(
                            "Error processing {}: {}",
                            entry.path().display(),
                            err
                        ));
                    }
                }
            }
        }

        for error in &scan_errors {
            log::warn!("{}", error);
        }

        if documents.is_empty() {
            return Err(self.empty_scan_error(root_path, permission_denied, &scan_errors));
        }

        documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        log::debug!(
            "Found {} markup files under {}",
            documents.len(),
            root_path.display()
        );

        Ok(documents)
    }

    /// Error for a walk that produced no documents. Only a denied directory
    /// turns it into a permission problem.
    fn empty_scan_error(
        &self,
        root_path: &Path,
        permission_denied: bool,
        scan_errors: &[String],
    ) -> HtmlTxtError {
        if permission_denied {
            return HtmlTxtError::Permission {
                path: format!("Multiple scan errors: {}", scan_errors.join(", ")),
            };
        }

        HtmlTxtError::NoDocumentsFound {
            folder: root_path.display().to_string(),
            searched_extensions: self.filter.get_extensions().clone(),
        }
    }

    // Exclude patterns only see the part of the path below the scan root.
    fn should_traverse(&self, entry: &DirEntry, root_path: &Path) -> bool {
        if entry.depth() == 0 || entry.file_type().is_file() {
            return true;
        }

        if entry.file_type().is_dir() {
            let relative = entry.path().strip_prefix(root_path).unwrap_or(entry.path());
            return self.filter.should_traverse_directory(relative);
        }

        true
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<DocumentFile>> {
        let path = entry.path();

        let relative_path = path
            .strip_prefix(root_path)
            .map_err(|_| HtmlTxtError::InvalidPath {
                path: format!(
                    "Cannot calculate relative path for {} from root {}",
                    path.display(),
                    root_path.display()
                ),
            })?
            .to_path_buf();

        if !self.filter.is_markup_file(&relative_path) {
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| HtmlTxtError::Io(e.into()))?;

        if !self.filter.is_size_allowed(metadata.len()) {
            log::info!(
                "Skipping {} ({} exceeds the size limit)",
                path.display(),
                format_bytes(metadata.len())
            );
            return Ok(None);
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Ok(Some(DocumentFile::new(
            path.to_path_buf(),
            relative_path,
            metadata.len(),
            modified,
        )))
    }

    pub fn get_statistics(&self, documents: &[DocumentFile]) -> ScanStatistics {
        let total_files = documents.len();
        let total_size = documents.iter().map(|d| d.size).sum();

        let mut files_by_extension = std::collections::HashMap::new();
        for doc in documents {
            *files_by_extension.entry(doc.extension.clone()).or_insert(0) += 1;
        }

        let (largest_file_size, largest_file_path) = documents
            .iter()
            .max_by_key(|d| d.size)
            .map(|d| (d.size, d.relative_path.clone()))
            .unwrap_or((0, PathBuf::new()));

        ScanStatistics {
            total_files,
            total_size,
            files_by_extension,
            largest_file_size,
            largest_file_path,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub files_by_extension: std::collections::HashMap<String, usize>,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if !self.files_by_extension.is_empty() {
            summary.push_str("  Files by type:\n");
            let mut extensions: Vec<_> = self.files_by_extension.iter().collect();
            extensions.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            for (ext, count) in extensions {
                summary.push_str(&format!("    {}: {} files\n", ext, count));
            }
        }

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file_path.display(),
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}
