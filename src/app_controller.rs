use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::Level;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::language_utils;
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::{CancellationSignal, LogEntry, LogSink, TranslationService};

// @module: Application controller for subtitle processing

/// Name of the issues log written next to processed folders
pub const ISSUES_LOG_NAME: &str = "srtran.issues.log";

/// Log sink that keeps log lines from tearing the progress bar and collects
/// warnings and errors for the issues log
#[derive(Default)]
pub struct ProgressSink {
    // @field: Bar of the file currently being translated
    bar: Mutex<Option<ProgressBar>>,
    // @field: Warnings and errors seen so far
    issues: Mutex<Vec<LogEntry>>,
}

impl ProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&self, bar: ProgressBar) {
        *self.bar.lock() = Some(bar);
    }

    fn detach(&self) {
        self.bar.lock().take();
    }

    /// Drain collected warnings and errors
    pub fn take_issues(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.issues.lock())
    }
}

impl LogSink for ProgressSink {
    fn log(&self, entry: LogEntry) {
        if entry.level <= Level::Warn {
            self.issues.lock().push(entry.clone());
        }

        let bar = self.bar.lock().clone();
        match bar {
            Some(bar) => bar.suspend(|| log::log!(target: "srtran", entry.level, "{}", entry.message)),
            None => log::log!(target: "srtran", entry.level, "{}", entry.message),
        }
    }

    fn progress(&self, processed: usize, total: usize) {
        if let Some(bar) = self.bar.lock().as_ref() {
            bar.set_length(total as u64);
            bar.set_position(processed as u64);
        }
    }
}

/// Result of processing a single file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Translation written to `output`
    Translated {
        output: PathBuf,
        subtitles: usize,
        duration: Duration,
    },
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Counters for a folder run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: Translation service shared by every file of the run
    service: TranslationService,
    // @field: Sink the service reports through
    sink: Arc<ProgressSink>,
    // @field: Draw progress bars
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller with the service described by `config`
    pub fn new(config: &Config, verbose: bool) -> Result<Self> {
        let sink = Arc::new(ProgressSink::new());
        let service = TranslationService::new(config.service_config(verbose), sink.clone())
            .context("Failed to initialize translation service")?;
        Ok(Self {
            service,
            sink,
            show_progress: true,
        })
    }

    /// Create a controller around an existing service, without progress bars
    pub fn with_service(service: TranslationService, sink: Arc<ProgressSink>) -> Self {
        Self {
            service,
            sink,
            show_progress: false,
        }
    }

    /// Translate one subtitle file
    ///
    /// The output defaults to `<stem>.<target>.srt` next to the input. An
    /// existing output is left alone unless `force_overwrite` is set.
    pub async fn run(
        &self,
        input_file: &Path,
        output_file: Option<&Path>,
        source_language: &str,
        target_language: &str,
        force_overwrite: bool,
        cancel: &CancellationSignal,
    ) -> Result<FileOutcome> {
        let start_time = Instant::now();

        if !input_file.is_file() {
            return Err(anyhow!("Input file does not exist: {}", input_file.display()));
        }

        let output_path = match output_file {
            Some(path) => path.to_path_buf(),
            None => output_path_for(input_file, target_language),
        };
        if output_path.exists() && !force_overwrite {
            log::warn!(
                "Skipping {}, translation already exists (use -f to force overwrite)",
                output_path.display()
            );
            return Ok(FileOutcome::Skipped(output_path));
        }

        let subtitles = SubtitleCollection::from_file(input_file)?;
        log::info!("Loaded {} subtitles from {}", subtitles.len(), input_file.display());

        let source = language_utils::display_language(source_language);
        let target = language_utils::display_language(target_language);
        if language_utils::languages_match(&source, &target) {
            log::warn!("Source and target language are both {}", target);
        }

        let progress_bar = self.progress_bar(subtitles.len() as u64);
        self.sink.attach(progress_bar.clone());

        let result = self
            .service
            .translate(&subtitles.entries, &source, &target, cancel)
            .await;

        self.sink.detach();
        let translated = match result {
            Ok(translated) => {
                progress_bar.finish_and_clear();
                translated
            }
            Err(e) => {
                progress_bar.abandon();
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to translate {}", input_file.display())));
            }
        };

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
        let subtitle_count = translated.len();
        SubtitleCollection::new(output_path.clone(), translated).write_to_srt(&output_path)?;

        let duration = start_time.elapsed();
        log::info!(
            "Success: {} ({} subtitles in {})",
            output_path.display(),
            subtitle_count,
            format_duration(duration)
        );

        Ok(FileOutcome::Translated {
            output: output_path,
            subtitles: subtitle_count,
            duration,
        })
    }

    /// Translate every `.srt` file under `input_dir`
    ///
    /// Failures of single files are counted and logged; cancellation stops
    /// the whole run. Warnings and errors end up in the issues log.
    pub async fn run_folder(
        &self,
        input_dir: &Path,
        source_language: &str,
        target_language: &str,
        force_overwrite: bool,
        cancel: &CancellationSignal,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {}", input_dir.display()));
        }

        let files = find_subtitle_files(input_dir, target_language)?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {}", input_dir.display()));
        }
        log::info!("Found {} subtitle file(s) in {}", files.len(), input_dir.display());

        let mut summary = FolderSummary::default();
        for (position, file) in files.iter().enumerate() {
            log::info!("[{}/{}] {}", position + 1, files.len(), file.display());

            match self
                .run(file, None, source_language, target_language, force_overwrite, cancel)
                .await
            {
                Ok(FileOutcome::Translated { .. }) => summary.translated += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) if is_cancellation(&e) => {
                    self.write_issues(input_dir, &summary, start_time.elapsed());
                    return Err(e);
                }
                Err(e) => {
                    self.sink.log(LogEntry::new(
                        Level::Error,
                        format!("Error processing file {}: {:#}", file.display(), e),
                    ));
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            "Folder processing completed: {} translated, {} skipped, {} errors",
            summary.translated,
            summary.skipped,
            summary.failed
        );
        self.write_issues(input_dir, &summary, start_time.elapsed());

        Ok(summary)
    }

    /// Stop the service's rate limiter
    pub fn close(&self) {
        self.service.close();
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} subtitles ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        progress_bar
    }

    fn write_issues(&self, input_dir: &Path, summary: &FolderSummary, duration: Duration) {
        let issues = self.sink.take_issues();
        if issues.is_empty() {
            return;
        }

        let log_file_path = input_dir.join(ISSUES_LOG_NAME);
        let context = format!(
            "Folder Processing: {} ({} translated, {} skipped, {} errors in {})",
            input_dir.display(),
            summary.translated,
            summary.skipped,
            summary.failed,
            format_duration(duration)
        );
        match write_issues_log(&log_file_path, &context, &issues) {
            Ok(()) => log::info!("Issues written to {}", log_file_path.display()),
            Err(e) => log::warn!("Failed to write issues log: {}", e),
        }
    }
}

fn is_cancellation(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<TranslationError>(), Some(TranslationError::Cancelled)))
}

/// Default output path: `<dir>/<stem>.<tag>.srt`
pub fn output_path_for(input_file: &Path, target_language: &str) -> PathBuf {
    let stem = input_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "subtitles".to_string());
    let file_name = format!("{}.{}.srt", stem, language_utils::file_tag(target_language));
    match input_file.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// All `.srt` files under `dir`, sorted, excluding earlier translations into
/// `target_language`
pub fn find_subtitle_files(dir: &Path, target_language: &str) -> Result<Vec<PathBuf>> {
    let translated_suffix = format!(".{}.srt", language_utils::file_tag(target_language));
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk directory: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_srt = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("srt"));
        let is_output = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase().ends_with(&translated_suffix))
            .unwrap_or(false);

        if is_srt && !is_output {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Append `entries` to the issues log under a timestamped header
pub fn write_issues_log(path: &Path, context: &str, entries: &[LogEntry]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open issues log: {}", path.display()))?;

    writeln!(file, "=== {} | {} ===", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"), context)?;
    for entry in entries {
        writeln!(file, "[{}] {}", entry.level, entry.message)?;
    }
    writeln!(file)?;
    Ok(())
}

// Format duration in a human-readable format
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, duration.subsec_millis())
    }
}
