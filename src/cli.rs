use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Directory depth used by `--recursive`.
const RECURSIVE_DEPTH: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "htmltxt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract structured plain text from HTML files")]
#[command(
    long_about = "htmltxt strips HTML files down to plain text: the page title, upper-cased \
                  headings, and paragraph and list text. Point it at a folder to combine \
                  every HTML file into one text file, or at a single file."
)]
#[command(after_help = "EXAMPLES:\n  \
    htmltxt ./site --output site.txt\n  \
    htmltxt ./site --recursive --workers 4 --output combined\n  \
    htmltxt page.html --stdout\n  \
    htmltxt ./site --extensions html,htm,xhtml --dedupe-nested -o out.txt\n  \
    htmltxt --generate-config --config htmltxt.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Folder of HTML files, or a single HTML file
    #[arg(required_unless_present = "generate_config")]
    pub input: Option<PathBuf>,

    /// File to save the extracted text to (.txt is added when no extension is given)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the extracted text to stdout instead of saving it
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// File extensions to treat as HTML (comma-separated)
    #[arg(short, long, help = "File extensions to extract (e.g., html,htm)")]
    pub extensions: Option<String>,

    /// Descend into subfolders
    #[arg(short, long)]
    pub recursive: bool,

    /// Maximum file size to process
    #[arg(long, value_parser = parse_size_string, help = "Maximum file size to process (e.g., 512KB, 10MB)")]
    pub max_size: Option<u64>,

    /// Files processed at the same time (0 = one worker per file)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Emit nested headings, paragraphs and list items only once
    #[arg(long)]
    pub dedupe_nested: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for status messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,

    /// List the files that would be processed without extracting them
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_extensions(self.extensions.clone())
            .with_max_file_size(self.max_size)
            .with_max_depth(self.recursive.then_some(RECURSIVE_DEPTH))
            .with_max_workers(self.workers)
            .with_dedupe_nested(self.dedupe_nested.then_some(true))
            .with_force_overwrite(self.force.then_some(true))
    }

    /// Save path offered at the prompt: `<input name>.txt` in the working directory.
    pub fn suggested_output_name(&self) -> String {
        self.input
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| format!("{}.txt", stem.to_string_lossy()))
            .unwrap_or_else(|| "extracted.txt".to_string())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `log` filter for the verbosity flags; `RUST_LOG` still wins.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity_level() {
            _ if self.quiet => "error",
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub fn parse_size_string(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (number_str, multiplier) = if s.ends_with("kb") || s.ends_with('k') {
        (s.trim_end_matches("kb").trim_end_matches('k'), 1024)
    } else if s.ends_with("mb") || s.ends_with('m') {
        (s.trim_end_matches("mb").trim_end_matches('m'), 1024 * 1024)
    } else if s.ends_with("gb") || s.ends_with('g') {
        (
            s.trim_end_matches("gb").trim_end_matches('g'),
            1024 * 1024 * 1024,
        )
    } else if s.ends_with('b') {
        (s.trim_end_matches('b'), 1)
    } else {
        (s.as_str(), 1)
    };

    let number: f64 = number_str
        .parse()
        .map_err(|_| format!("Invalid number format: {}", number_str))?;

    if number < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    Ok((number * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("htmltxt").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_basic_arguments() {
        let cli = parse(&["site", "-o", "out.txt", "-w", "4", "-r"]);
        assert_eq!(cli.input, Some(PathBuf::from("site")));
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
        assert_eq!(cli.workers, Some(4));
        assert!(cli.recursive);
        assert!(!cli.stdout);
    }

    #[test]
    fn test_input_required_unless_generating_config() {
        let result = Cli::try_parse_from(["htmltxt", "--quiet"]);
        assert!(result.is_err());

        let cli = parse(&["--generate-config"]);
        assert!(cli.generate_config);
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_stdout_conflicts_with_output() {
        let result = Cli::try_parse_from(["htmltxt", "site", "--stdout", "-o", "x.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = parse(&["site", "--recursive", "--dedupe-nested", "--max-size", "2MB", "--force"]);
        let overrides = cli.create_cli_overrides();

        assert_eq!(overrides.max_depth, Some(RECURSIVE_DEPTH));
        assert_eq!(overrides.dedupe_nested, Some(true));
        assert_eq!(overrides.max_file_size, Some(2 * 1024 * 1024));
        assert_eq!(overrides.force_overwrite, Some(true));

        let cli = parse(&["site"]);
        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.max_depth, None);
        assert_eq!(overrides.dedupe_nested, None);
        assert_eq!(overrides.force_overwrite, None);
    }

    #[test]
    fn test_suggested_output_name() {
        assert_eq!(parse(&["docs/site"]).suggested_output_name(), "site.txt");
        assert_eq!(parse(&["page.html"]).suggested_output_name(), "page.txt");
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(parse(&["site"]).log_filter(), "warn");
        assert_eq!(parse(&["site", "-vv"]).log_filter(), "debug");
        assert_eq!(parse(&["site", "-q"]).log_filter(), "error");
    }

    #[test]
    fn test_parse_size_string() {
        assert_eq!(parse_size_string("10").unwrap(), 10);
        assert_eq!(parse_size_string("10KB").unwrap(), 10 * 1024);
        assert_eq!(parse_size_string("5MB").unwrap(), 5 * 1024 * 1024);
        assert_eq!(parse_size_string("1GB").unwrap(), 1024 * 1024 * 1024);

        assert!(parse_size_string("invalid").is_err());
        assert!(parse_size_string("-5MB").is_err());
    }
}
