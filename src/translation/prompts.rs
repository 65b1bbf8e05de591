/*!
 * The instruction template shared by every provider.
 */

/// Separator between serialized subtitles, both in prompts and responses
pub const SUBTITLE_SEPARATOR: &str = "===SUBTITLE===";

/// Phrases from the format section; a response segment containing one of
/// them is the model echoing the instructions back.
pub const FORMAT_ECHO_MARKERS: [&str; 2] = ["(subtitle number)", "separator between blocks"];

const TEMPLATE: &str = "You are a professional subtitle translator. Translate the subtitles below from {source_language} to {target_language}, following these rules:
1. Keep each translation about as long as the original so the timing still works
2. Keep the original line breaks and any formatting markers (e.g. <i>, [music])
3. Never split or merge subtitle blocks
4. Leave proper nouns and technical terms in the original language when there is no direct translation
5. Match the register of the source speech
6. Replace idioms with culturally equivalent expressions
7. Keep numbers, measurements and codes exactly as written
8. Keep the capitalization style of on-screen text
9. Leave placeholder markers such as [%1] unchanged
10. Use contractions where they sound natural in speech

Format:
[N] (subtitle number)
Translated text (same line breaks)
===SUBTITLE=== separator between blocks

Subtitles to translate:

{batch_text}";

/// Render the translation instructions for one batch
pub fn render_translation_prompt(source_language: &str, target_language: &str, batch_text: &str) -> String {
    TEMPLATE
        .replace("{source_language}", source_language)
        .replace("{target_language}", target_language)
        .replace("{batch_text}", batch_text)
}
