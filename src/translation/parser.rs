/*!
 * Decoding of model output into per-subtitle line groups.
 *
 * Models answer in the shape requested by the prompt:
 *
 * ```text
 * [1]
 * first subtitle
 * ===SUBTITLE===
 * [2]
 * second subtitle
 * ```
 *
 * Parsing is pure and forgiving: empty segments are dropped, echoed format
 * instructions in front of the first translation are cut away, and anything
 * after the expected number of groups (trailing commentary) is ignored.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::prompts::{FORMAT_ECHO_MARKERS, SUBTITLE_SEPARATOR};

// @const: Positional marker on its own at the start of a segment
static POSITION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\s*\d+\s*\]").expect("marker regex is valid")
});

// @const: Positional marker at the start of any line
static LINE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\[\s*\d+\s*\]").expect("marker regex is valid")
});

/// Split a raw response into at most `expected` line groups, in order
pub fn parse_response(raw: &str, expected: usize) -> Vec<Vec<String>> {
    let mut groups = Vec::new();

    for segment in raw.split(SUBTITLE_SEPARATOR) {
        if groups.len() >= expected {
            break;
        }

        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        // Echoed instructions only ever precede the translations
        let segment = if groups.is_empty() {
            match trim_instruction_echo(segment) {
                Some(rest) => rest,
                None => continue,
            }
        } else {
            segment
        };

        let body = strip_position_marker(segment);
        if body.is_empty() {
            continue;
        }

        groups.push(body.lines().map(|line| line.trim_end().to_string()).collect());
    }

    groups
}

fn is_instruction_echo(text: &str) -> bool {
    FORMAT_ECHO_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Drop echoed instruction text in front of the first `[n]` marker line.
/// Returns `None` when the segment holds nothing but the echo.
fn trim_instruction_echo(segment: &str) -> Option<&str> {
    let preamble_end = LINE_MARKER.find(segment).map_or(segment.len(), |found| found.start());
    if !is_instruction_echo(&segment[..preamble_end]) {
        return Some(segment);
    }
    (preamble_end < segment.len()).then(|| &segment[preamble_end..])
}

/// Remove a leading `[n]` marker line. A marker followed by text on the same
/// line is stripped as well.
fn strip_position_marker(segment: &str) -> &str {
    match POSITION_MARKER.find(segment) {
        Some(found) => segment[found.end()..].trim(),
        None => segment,
    }
}
