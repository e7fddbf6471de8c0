use crate::error::{HtmlTxtError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub filters: FilterConfig,
    pub batch: BatchConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Upper bound on files processed at once. `0` runs every file at once.
    pub max_workers: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExtractConfig {
    /// Skip matched elements nested inside another matched element.
    pub dedupe_nested: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub default_extension: String,
    pub force_overwrite: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["html".to_string(), "htm".to_string()],
            max_file_size: 50 * 1024 * 1024, // 50MB
            exclude_patterns: vec![],
            max_depth: 1, // Only the selected folder itself
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_extension: "txt".to_string(),
            force_overwrite: false,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HtmlTxtError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HtmlTxtError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| HtmlTxtError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["htmltxt.toml", "htmltxt.config.toml", ".htmltxt.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref extensions) = cli_args.extensions {
            self.filters.extensions = extensions
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.filters.max_file_size = max_size;
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.filters.max_depth = max_depth;
        }

        if let Some(workers) = cli_args.max_workers {
            self.batch.max_workers = workers;
        }

        if let Some(dedupe) = cli_args.dedupe_nested {
            self.extract.dedupe_nested = dedupe;
        }

        if let Some(force) = cli_args.force_overwrite {
            self.output.force_overwrite = force;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| HtmlTxtError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| HtmlTxtError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.filters.extensions.is_empty() {
            return Err(HtmlTxtError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if self.filters.max_file_size == 0 {
            return Err(HtmlTxtError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if self.filters.max_depth == 0 {
            return Err(HtmlTxtError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        for pattern in &self.filters.exclude_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(HtmlTxtError::Config {
                    message: format!("Invalid exclude pattern '{}': {}", pattern, e),
                });
            }
        }

        let ext = &self.output.default_extension;
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(HtmlTxtError::Config {
                message: format!(
                    "Default output extension must be a bare extension like 'txt', got '{}'",
                    ext
                ),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extensions: Option<String>,
    pub max_file_size: Option<u64>,
    pub max_depth: Option<usize>,
    pub max_workers: Option<usize>,
    pub dedupe_nested: Option<bool>,
    pub force_overwrite: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, extensions: Option<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_workers(mut self, workers: Option<usize>) -> Self {
        self.max_workers = workers;
        self
    }

    pub fn with_dedupe_nested(mut self, dedupe: Option<bool>) -> Self {
        self.dedupe_nested = dedupe;
        self
    }

    pub fn with_force_overwrite(mut self, force: Option<bool>) -> Self {
        self.force_overwrite = force;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.filters.extensions, vec!["html", "htm"]);
        assert_eq!(config.filters.max_depth, 1);
        assert!(config.batch.max_workers >= 1);
        assert!(!config.extract.dedupe_nested);
        assert_eq!(config.output.default_extension, "txt");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.filters.extensions.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.default_extension = ".txt".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.filters.exclude_patterns = vec!["(unclosed".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unbounded_workers_is_valid() {
        let mut config = Config::default();
        config.batch.max_workers = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.batch.max_workers = 3;
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.batch.max_workers, 3);
        assert_eq!(loaded_config.filters.extensions, config.filters.extensions);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/not/here/htmltxt.toml");
        assert!(matches!(result, Err(HtmlTxtError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_extensions(Some(".HTML, xhtml,".to_string()))
            .with_max_workers(Some(0))
            .with_max_depth(Some(8))
            .with_dedupe_nested(Some(true));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.filters.extensions, vec!["html", "xhtml"]);
        assert_eq!(config.batch.max_workers, 0);
        assert_eq!(config.filters.max_depth, 8);
        assert!(config.extract.dedupe_nested);
        assert!(!config.output.force_overwrite);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[filters]"));
        assert!(sample.contains("[batch]"));
        assert!(sample.contains("[extract]"));
        assert!(sample.contains("[output]"));
    }
}
