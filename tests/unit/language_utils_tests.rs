/*!
 * Tests for language code utilities
 */

use srtran::language_utils::{display_language, file_tag, get_language_name, language_from_code, languages_match};

#[test]
fn test_get_language_name_withIsoCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fra").unwrap(), "French");
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
    assert_eq!(get_language_name("ger").unwrap(), "German");
}

#[test]
fn test_get_language_name_withUnknownCode_shouldFail() {
    assert!(get_language_name("xx").is_err());
    assert!(get_language_name("English").is_err());
    assert!(get_language_name("").is_err());
}

#[test]
fn test_language_from_code_withBibliographicCode_shouldMatchTerminologic() {
    assert_eq!(language_from_code("chi"), language_from_code("zho"));
    assert_eq!(language_from_code("dut"), language_from_code("nl"));
    assert!(language_from_code("zho").is_some());
}

#[test]
fn test_display_language_shouldLeaveFreeFormLabelsAlone() {
    assert_eq!(display_language("es"), "Spanish");
    assert_eq!(display_language("Latin American Spanish"), "Latin American Spanish");
}

#[test]
fn test_file_tag_withNamesAndCodes_shouldBeFileNameSafe() {
    assert_eq!(file_tag("ger"), "de");
    assert_eq!(file_tag("Norwegian Bokmål"), "norwegian-bokmål");
    assert_eq!(file_tag("  pt / BR "), "pt-br");
}

#[test]
fn test_languages_match_withMixedLabels_shouldCompareLanguages() {
    assert!(languages_match("de", "ger"));
    assert!(languages_match("Spanish", "spanish"));
    assert!(!languages_match("fr", "French Canadian"));
}
