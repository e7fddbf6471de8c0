use crate::error::{FileFailure, HtmlTxtError, Result};
use crate::extractor::text_extractor::{ExtractedText, TextExtractor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{self, JoinSet};

/// Separator placed between documents in the combined output.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

pub type ProgressCallback = Arc<dyn Fn(&FileOutcome) + Send + Sync>;

/// Result of processing one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Position of the file in the input list.
    pub input_index: usize,
    pub bytes_read: u64,
    pub elapsed: Duration,
    pub result: std::result::Result<ExtractedText, FileFailure>,
}

impl FileOutcome {
    fn failed(path: PathBuf, input_index: usize, elapsed: Duration, error: &HtmlTxtError) -> Self {
        Self {
            path,
            input_index,
            bytes_read: 0,
            elapsed,
            result: Err(FileFailure::from(error)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Rendered text, or the empty string for a failed file.
    pub fn text(&self) -> String {
        match self.result {
            Ok(ref extracted) => extracted.render(),
            Err(_) => String::new(),
        }
    }

    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Every outcome of a batch, in the order the workers finished.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    outcomes: Vec<FileOutcome>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub max_workers: usize,
}

impl BatchReport {
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Joins every document's text in completion order. Failed files
    /// contribute an empty string, so the separator count is always `len() - 1`.
    pub fn combined_text(&self) -> String {
        self.outcomes
            .iter()
            .map(FileOutcome::text)
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &FileFailure)> {
        self.outcomes.iter().filter_map(|o| match o.result {
            Err(ref failure) => Some((o.path.as_path(), failure)),
            Ok(_) => None,
        })
    }

    pub fn total_bytes(&self) -> u64 {
        self.outcomes.iter().map(|o| o.bytes_read).sum()
    }
}

pub struct BatchRunner {
    extractor: Arc<TextExtractor>,
    max_workers: usize,
}

impl BatchRunner {
    pub fn new(extractor: TextExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
            max_workers: num_cpus::get(),
        }
    }

    /// Caps how many files are processed at once; `0` removes the cap.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    fn worker_limit(&self, files: usize) -> usize {
        if self.max_workers == 0 {
            files
        } else {
            self.max_workers.min(files)
        }
    }

    /// Extracts every path concurrently and waits for all of them.
    ///
    /// A file that cannot be read or decoded is logged and recorded as a
    /// failed outcome; it never aborts the batch.
    pub async fn run(
        &self,
        paths: &[PathBuf],
        progress: Option<ProgressCallback>,
    ) -> Result<BatchReport> {
        if paths.is_empty() {
            return Err(HtmlTxtError::EmptyBatch);
        }

        let started_at = Utc::now();
        let start = Instant::now();
        let limit = self.worker_limit(paths.len());
        let permits = Arc::new(Semaphore::new(limit));
        let (sender, mut receiver) = mpsc::unbounded_channel::<FileOutcome>();
        let mut workers = JoinSet::new();

        log::debug!("Launching {} workers (cap {})", paths.len(), limit);

        for (input_index, path) in paths.iter().cloned().enumerate() {
            let permits = Arc::clone(&permits);
            let extractor = Arc::clone(&self.extractor);
            let sender = sender.clone();
            let progress = progress.clone();

            workers.spawn(async move {
                // The semaphore is never closed, so acquisition only fails on shutdown.
                let _permit = permits.acquire_owned().await.ok();
                let outcome = process_file(extractor, path, input_index).await;

                if let Some(ref callback) = progress {
                    callback(&outcome);
                }
                let _ = sender.send(outcome);
            });
        }
        drop(sender);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                log::error!("Worker terminated abnormally: {}", e);
            }
        }

        let mut outcomes = Vec::with_capacity(paths.len());
        while let Some(outcome) = receiver.recv().await {
            outcomes.push(outcome);
        }

        // A worker that died before reporting still owes the batch one outcome.
        if outcomes.len() < paths.len() {
            let mut reported = vec![false; paths.len()];
            for outcome in &outcomes {
                reported[outcome.input_index] = true;
            }
            for (input_index, path) in paths.iter().enumerate() {
                if !reported[input_index] {
                    let error = HtmlTxtError::Worker {
                        message: format!("no result for {}", path.display()),
                    };
                    outcomes.push(FileOutcome::failed(
                        path.clone(),
                        input_index,
                        Duration::ZERO,
                        &error,
                    ));
                }
            }
        }

        Ok(BatchReport {
            outcomes,
            started_at,
            duration: start.elapsed(),
            max_workers: limit,
        })
    }
}

async fn process_file(
    extractor: Arc<TextExtractor>,
    path: PathBuf,
    input_index: usize,
) -> FileOutcome {
    let start = Instant::now();
    log::debug!("Processing {}", path.display());

    let worker_path = path.clone();
    let result = task::spawn_blocking(move || extractor.extract_file(&worker_path))
        .await
        .unwrap_or_else(|e| {
            Err(HtmlTxtError::Worker {
                message: e.to_string(),
            })
        });

    match result {
        Ok((text, bytes_read)) => FileOutcome {
            path,
            input_index,
            bytes_read,
            elapsed: start.elapsed(),
            result: Ok(text),
        },
        Err(e) => {
            log::warn!("Error processing file {}: {}", path.display(), e);
            FileOutcome::failed(path, input_index, start.elapsed(), &e)
        }
    }
}
