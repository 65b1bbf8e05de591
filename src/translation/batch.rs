/*!
 * Batch construction for translation requests.
 *
 * Subtitles are grouped into contiguous batches and each batch is
 * serialized into a single prompt payload with numbered markers, so one
 * model call covers many subtitles while every answer can still be matched
 * back to its subtitle.
 */

use crate::subtitle_processor::SubtitleEntry;

use super::prompts::SUBTITLE_SEPARATOR;

/// A contiguous slice of the input, with its position range
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Zero-based batch number
    pub number: usize,
    /// Position of the first unit in the full input
    pub start: usize,
    /// Units of this batch
    pub entries: &'a [SubtitleEntry],
}

impl<'a> Batch<'a> {
    /// Position one past the last unit
    pub fn end(&self) -> usize {
        self.start + self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the batch for the prompt.
    ///
    /// Each subtitle is written as `[n]` (1-based within the batch) followed
    /// by its lines; subtitles are separated by the separator line.
    pub fn serialize(&self) -> String {
        let mut combined_text = String::new();

        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                combined_text.push('\n');
                combined_text.push_str(SUBTITLE_SEPARATOR);
                combined_text.push('\n');
            }
            combined_text.push_str(&format!("[{}]\n", idx + 1));
            combined_text.push_str(&entry.source_lines.join("\n"));
            combined_text.push('\n');
        }

        combined_text
    }

    /// Copy the batch with translations attached, leaving the input untouched.
    ///
    /// `groups` must hold exactly one line group per entry.
    pub fn with_translations(&self, groups: Vec<Vec<String>>) -> Vec<SubtitleEntry> {
        debug_assert_eq!(groups.len(), self.entries.len());
        self.entries
            .iter()
            .zip(groups)
            .map(|(entry, lines)| {
                let mut translated_entry = entry.clone();
                translated_entry.translated_lines = lines;
                translated_entry
            })
            .collect()
    }
}

/// Split `entries` into consecutive batches of at most `batch_size` units
pub fn split_into_batches(entries: &[SubtitleEntry], batch_size: usize) -> Vec<Batch<'_>> {
    let batch_size = batch_size.max(1);
    entries
        .chunks(batch_size)
        .enumerate()
        .map(|(number, chunk)| Batch {
            number,
            start: number * batch_size,
            entries: chunk,
        })
        .collect()
}

/// Number of batches `total` units produce
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size.max(1))
}
