use crate::config::FilterConfig;
use regex::Regex;
use std::path::Path;

pub struct FileFilter {
    extensions: Vec<String>,
    max_file_size: u64,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            extensions: config.extensions.iter().map(|e| e.to_lowercase()).collect(),
            max_file_size: config.max_file_size,
            exclude_patterns,
        }
    }

    /// Exclude patterns are matched against `path` as given, so pass it
    /// relative to the scan root.
    pub fn is_markup_file(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|s| s.to_str()) else {
            return false;
        };

        if !self.extensions.contains(&extension.to_lowercase()) {
            return false;
        }

        !self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            // Skip hidden directories (starting with .)
            if dir_name.starts_with('.') && dir_name != "." && dir_name != ".." {
                return false;
            }

            if self.matches_any_pattern(&path.to_string_lossy()) {
                return false;
            }
        }

        true
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        &self.extensions
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }

}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> FilterConfig {
        FilterConfig {
            extensions: vec!["html".to_string(), "htm".to_string()],
            max_file_size: 1024 * 1024, // 1MB
            exclude_patterns: vec![r".*\.bak\..*".to_string(), r"drafts".to_string()],
            max_depth: 1,
        }
    }

    #[test]
    fn test_markup_file_detection() {
        let filter = FileFilter::new(&create_test_config());

        assert!(filter.is_markup_file(Path::new("index.html")));
        assert!(filter.is_markup_file(Path::new("old/page.htm")));
        assert!(filter.is_markup_file(Path::new("INDEX.HTML")));
        assert!(filter.is_markup_file(Path::new("Page.Htm")));

        assert!(!filter.is_markup_file(Path::new("style.css")));
        assert!(!filter.is_markup_file(Path::new("notes.txt")));
        assert!(!filter.is_markup_file(Path::new("html")));
        assert!(!filter.is_markup_file(Path::new("page.html.gz")));
    }

    #[test]
    fn test_exclude_patterns() {
        let filter = FileFilter::new(&create_test_config());

        assert!(!filter.is_markup_file(Path::new("index.bak.html")));
        assert!(filter.matches_any_pattern("site/drafts/a.html"));
        assert!(!filter.matches_any_pattern("site/posts/a.html"));
        assert!(!filter.should_traverse_directory(Path::new("site/drafts")));
    }

    #[test]
    fn test_directory_traversal_rules() {
        let filter = FileFilter::new(&create_test_config());

        assert!(filter.should_traverse_directory(Path::new("pages")));
        assert!(filter.should_traverse_directory(Path::new("archive")));
        assert!(!filter.should_traverse_directory(Path::new(".git")));
        assert!(!filter.should_traverse_directory(Path::new(".cache")));
    }

    #[test]
    fn test_size_limits() {
        let filter = FileFilter::new(&create_test_config());

        assert!(filter.is_size_allowed(1024));
        assert!(filter.is_size_allowed(1024 * 1024));
        assert!(!filter.is_size_allowed(2 * 1024 * 1024));
    }

    #[test]
    fn test_extensions_normalized() {
        let config = FilterConfig {
            extensions: vec!["XHTML".to_string()],
            ..create_test_config()
        };
        let filter = FileFilter::new(&config);

        assert_eq!(filter.get_extensions(), &vec!["xhtml".to_string()]);
        assert!(filter.is_markup_file(Path::new("doc.xhtml")));
    }
}
