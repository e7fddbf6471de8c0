use clap::Parser;
use htmltxt::{
    Cli, HtmlTxt, HtmlTxtError, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(&cli);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let htmltxt = match HtmlTxt::from_cli(&cli) {
        Ok(htmltxt) => htmltxt,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let Some(input) = cli.input.as_deref() else {
        return 1;
    };

    if cli.dry_run {
        return handle_dry_run(input, &htmltxt);
    }

    let result = if input.is_dir() {
        run_folder(&cli, &htmltxt, input).await
    } else {
        run_single_file(&cli, &htmltxt, input)
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            htmltxt.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

async fn run_folder(cli: &Cli, htmltxt: &HtmlTxt, folder: &Path) -> htmltxt::Result<i32> {
    let report = htmltxt.extract_folder(folder).await?;
    deliver(cli, htmltxt, &report.combined_text())?;

    if report.succeeded() == report.len() {
        Ok(0)
    } else {
        Ok(2) // Success with per-file failures
    }
}

fn run_single_file(cli: &Cli, htmltxt: &HtmlTxt, file: &Path) -> htmltxt::Result<i32> {
    let text = htmltxt.extract_file(file)?;
    deliver(cli, htmltxt, &text.render())?;
    Ok(0)
}

/// Hands the text to stdout, the `--output` path, or the interactive prompt.
fn deliver(cli: &Cli, htmltxt: &HtmlTxt, content: &str) -> htmltxt::Result<()> {
    if cli.stdout {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    let path: Option<PathBuf> = cli.output.clone().or_else(|| {
        htmltxt
            .output_formatter()
            .prompt_save_path(&cli.suggested_output_name())
    });

    htmltxt.save_output(content, path.as_deref())?;
    Ok(())
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "htmltxt.toml".to_string());

    match HtmlTxt::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  htmltxt <folder> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(input: &Path, htmltxt: &HtmlTxt) -> i32 {
    let formatter = htmltxt.output_formatter();

    formatter.info("DRY RUN MODE - No text will be extracted or saved");
    formatter.print_separator();

    let config = htmltxt.config();
    formatter.info("Configuration that would be used:");
    println!("  Extensions: {}", config.filters.extensions.join(", "));
    println!("  Max file size: {} bytes", config.filters.max_file_size);
    println!("  Max depth: {}", config.filters.max_depth);
    if config.batch.max_workers == 0 {
        println!("  Workers: one per file");
    } else {
        println!("  Workers: {}", config.batch.max_workers);
    }
    println!("  Dedupe nested elements: {}", config.extract.dedupe_nested);

    formatter.print_separator();

    if input.is_file() {
        println!("  Would extract single file: {}", input.display());
    } else {
        let documents = match htmltxt.scan_folder(input) {
            Ok(documents) => documents,
            Err(e) => {
                htmltxt.handle_error(&e);
                return exit_code_for(&e);
            }
        };

        formatter.info("Files that would be processed:");
        for document in &documents {
            println!("  {} ({})", document.display_path(), document.format_size());
        }
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    0
}

fn exit_code_for(error: &HtmlTxtError) -> i32 {
    match error {
        HtmlTxtError::InvalidPath { .. } => 3,
        HtmlTxtError::Decode { .. } => 4,
        HtmlTxtError::NoDocumentsFound { .. } => 6,
        HtmlTxtError::Permission { .. } => 7,
        HtmlTxtError::OutputExists { .. } => 8,
        HtmlTxtError::SaveCancelled => 10,
        _ => 1,
    }
}

fn print_startup_error(error: &HtmlTxtError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use htmltxt::Config;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("htmltxt").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        let cli = parse(&["--generate-config", "--config", config_path.to_str().unwrap()]);

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[filters]"));
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("index.html"), "<p>x</p>").unwrap();

        let htmltxt = HtmlTxt::new(Config::default(), OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(temp_dir.path(), &htmltxt), 0);
    }

    #[test]
    fn test_dry_run_without_html() {
        let temp_dir = TempDir::new().unwrap();

        let htmltxt = HtmlTxt::new(Config::default(), OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(temp_dir.path(), &htmltxt), 6);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&HtmlTxtError::SaveCancelled), 10);
        assert_eq!(exit_code_for(&HtmlTxtError::EmptyBatch), 1);
        assert_eq!(
            exit_code_for(&HtmlTxtError::OutputExists {
                path: "x".to_string()
            }),
            8
        );
    }
}
