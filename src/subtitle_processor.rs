use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: SRT decoding and encoding

// @const: SRT timing line, timestamps are kept verbatim
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)\s+-->\s+(\S+)").expect("timing regex is valid")
});

/// One subtitle block, the unit of translation.
///
/// `start` and `end` are opaque to the translation service and are written
/// back exactly as they were read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtitleEntry {
    // @field: Sequence number from the file
    pub index: usize,

    // @field: Start timestamp as written in the file
    pub start: String,

    // @field: End timestamp as written in the file
    pub end: String,

    // @field: Source text, one element per line
    pub source_lines: Vec<String>,

    // @field: Translated text, empty until translated
    pub translated_lines: Vec<String>,
}

/// The translation service works on subtitle entries directly
pub type TranslationUnit = SubtitleEntry;

impl SubtitleEntry {
    pub fn new(index: usize, start: impl Into<String>, end: impl Into<String>, lines: Vec<String>) -> Self {
        SubtitleEntry {
            index,
            start: start.into(),
            end: end.into(),
            source_lines: lines,
            translated_lines: Vec::new(),
        }
    }

    /// Whether a translation has been attached
    pub fn is_translated(&self) -> bool {
        !self.translated_lines.is_empty()
    }

    /// Lines to write out: the translation when present, else the source
    pub fn output_lines(&self) -> &[String] {
        if self.is_translated() {
            &self.translated_lines
        } else {
            &self.source_lines
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start, self.end)?;
        for line in self.output_lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Ordered subtitles read from one file
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    // @field: File the entries came from
    pub source_file: PathBuf,

    // @field: Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    pub fn new(source_file: PathBuf, entries: Vec<SubtitleEntry>) -> Self {
        Self { source_file, entries }
    }

    /// Decode an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        let entries = Self::parse_srt_string(&content)
            .map_err(|_| SubtitleError::Empty(path.display().to_string()))?;
        Ok(Self::new(path.to_path_buf(), entries))
    }

    /// Decode SRT text into entries.
    ///
    /// Lines are trimmed and blank lines separate blocks. A block without a
    /// timing line is dropped, as are stray lines before its timing line.
    pub fn parse_srt_string(content: &str) -> std::result::Result<Vec<SubtitleEntry>, SubtitleError> {
        let mut entries = Vec::new();
        let mut current: Option<SubtitleEntry> = None;
        let mut at_block_start = true;

        let content = content.trim_start_matches('\u{feff}');
        for raw_line in content.lines() {
            let line = raw_line.trim();

            if line.is_empty() {
                at_block_start = true;
                continue;
            }

            let starts_block = at_block_start || current.as_ref().is_none_or(|c| c.start.is_empty());
            if starts_block {
                if let Ok(index) = line.parse::<usize>() {
                    if let Some(done) = current.take().filter(|c| !c.start.is_empty()) {
                        entries.push(done);
                    }
                    current = Some(SubtitleEntry { index, ..Default::default() });
                    at_block_start = false;
                    continue;
                }
            }
            at_block_start = false;

            let Some(entry) = current.as_mut() else {
                continue;
            };

            if entry.start.is_empty() {
                // Anything before the timing line is noise
                if let Some(caps) = TIMING_REGEX.captures(line) {
                    entry.start = caps[1].to_string();
                    entry.end = caps[2].to_string();
                }
                continue;
            }

            entry.source_lines.push(line.to_string());
        }

        if let Some(done) = current.filter(|c| !c.start.is_empty()) {
            entries.push(done);
        }

        if entries.is_empty() {
            return Err(SubtitleError::Empty("input".to_string()));
        }

        Ok(entries)
    }

    /// Encode entries as SRT text
    pub fn to_srt_string(entries: &[SubtitleEntry]) -> String {
        entries
            .iter()
            .map(|entry| entry.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the collection to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = fs::File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(Self::to_srt_string(&self.entries).as_bytes())
            .with_context(|| format!("Failed to write subtitles to {}", path.display()))?;
        file.flush()?;
        Ok(())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::to_srt_string(&self.entries))
    }
}
