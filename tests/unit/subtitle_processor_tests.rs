/*!
 * Tests for SRT decoding and encoding
 */

use anyhow::Result;

use srtran::errors::SubtitleError;
use srtran::subtitle_processor::{SubtitleCollection, SubtitleEntry};

use crate::common;

#[test]
fn test_parse_srt_string_withSampleFile_shouldKeepTimingAndLines() -> Result<()> {
    let entries = SubtitleCollection::parse_srt_string(common::SAMPLE_SRT)?;

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].index, 1);
    assert_eq!(entries[0].start, "00:00:01,000");
    assert_eq!(entries[0].end, "00:00:04,000");
    assert_eq!(entries[1].source_lines, vec!["It contains", "multiple lines."]);
    assert!(entries.iter().all(|entry| !entry.is_translated()));
    Ok(())
}

#[test]
fn test_parse_srt_string_withBomAndCrlf_shouldParse() -> Result<()> {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nWorld\r\n";

    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].source_lines, vec!["Hello"]);
    assert_eq!(entries[1].start, "00:00:03,000");
    Ok(())
}

#[test]
fn test_parse_srt_string_withMissingTimingLine_shouldDropBlock() -> Result<()> {
    let content = "1\nno timing here\n\n2\n00:00:03,000 --> 00:00:04,000\nKept\n";

    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index, 2);
    assert_eq!(entries[0].source_lines, vec!["Kept"]);
    Ok(())
}

#[test]
fn test_parse_srt_string_withNumericTextLine_shouldKeepItAsText() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nCount down\n10\n\n2\n00:00:03,000 --> 00:00:04,000\nLift off\n";

    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].source_lines, vec!["Count down", "10"]);
    Ok(())
}

#[test]
fn test_parse_srt_string_withNoSubtitles_shouldFail() {
    assert!(matches!(
        SubtitleCollection::parse_srt_string("just some text\nwithout blocks\n"),
        Err(SubtitleError::Empty(_))
    ));
    assert!(SubtitleCollection::parse_srt_string("").is_err());
}

#[test]
fn test_to_srt_string_withTranslations_shouldWriteTranslatedLines() {
    let mut first = SubtitleEntry::new(1, "00:00:01,000", "00:00:02,000", vec!["Hello".to_string()]);
    first.translated_lines = vec!["Bonjour".to_string()];
    let second = SubtitleEntry::new(2, "00:00:03,000", "00:00:04,000", vec!["Untouched".to_string()]);

    let srt = SubtitleCollection::to_srt_string(&[first, second]);

    assert_eq!(
        srt,
        "1\n00:00:01,000 --> 00:00:02,000\nBonjour\n\n2\n00:00:03,000 --> 00:00:04,000\nUntouched\n"
    );
}

#[test]
fn test_write_to_srt_thenFromFile_shouldPreserveEntries() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(dir.path(), "input.srt")?;

    let collection = SubtitleCollection::from_file(&input)?;
    let output = dir.path().join("copy.srt");
    collection.write_to_srt(&output)?;
    let reloaded = SubtitleCollection::from_file(&output)?;

    assert_eq!(reloaded.entries, collection.entries);
    assert_eq!(reloaded.source_file, output);
    Ok(())
}

#[test]
fn test_from_file_withMissingFile_shouldFail() {
    assert!(SubtitleCollection::from_file("/no/such/file.srt").is_err());
}
