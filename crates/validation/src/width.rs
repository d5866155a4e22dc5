//! Platform display-width model and single-field checks.

use adsync_core::types::ValidationIssue;

/// Whether a character falls in the East Asian Wide or Fullwidth classes
/// and therefore counts as 2 display units on the platform.
fn is_double_width(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F      // Hangul Jamo
        | 0x2E80..=0x303E    // CJK radicals, Kangxi, CJK symbols
        | 0x3041..=0x33FF    // Hiragana, Katakana, compat, enclosed
        | 0x3400..=0x4DBF    // CJK Extension A
        | 0x4E00..=0x9FFF    // CJK Unified Ideographs
        | 0xA000..=0xA4CF    // Yi
        | 0xAC00..=0xD7A3    // Hangul Syllables
        | 0xF900..=0xFAFF    // CJK Compatibility Ideographs
        | 0xFE10..=0xFE19    // Vertical Forms
        | 0xFE30..=0xFE4F    // CJK Compatibility Forms
        | 0xFF00..=0xFF60    // Fullwidth Forms
        | 0xFFE0..=0xFFE6    // Fullwidth signs
        | 0x16FE0..=0x18AFF  // Tangut, Khitan, ideographic symbols
        | 0x1B000..=0x1B2FF  // Kana Supplement / Extended
        | 0x1F000..=0x1F02F  // Mahjong & Domino Tiles
        | 0x1F300..=0x1F64F  // Emoji & pictographs
        | 0x1F680..=0x1F6FF  // Transport pictographs
        | 0x1F900..=0x1F9FF  // Supplemental pictographs
        | 0x1FA70..=0x1FAFF  // Symbols & Pictographs Extended-A
        | 0x20000..=0x2FFFD  // CJK Extension B..F
        | 0x30000..=0x3FFFD  // CJK Extension G
    )
}

/// Display width of `text` under the platform's character-counting rule.
/// This is NOT a code-point count: CJK wide/fullwidth characters cost 2.
pub fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| if is_double_width(c) { 2 } else { 1 })
        .sum()
}

/// Validate one text field against a width budget. Empty text is invalid.
pub fn validate_field(field: &str, text: &str, limit: usize) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if text.is_empty() {
        issues.push(ValidationIssue::new(field, "must not be empty"));
        return issues;
    }

    let width = display_width(text);
    if width > limit {
        issues.push(ValidationIssue::new(
            field,
            format!("exceeds {limit} character units (actual: {width})"),
        ));
    }

    issues
}

/// Lossy best-effort correction: drop trailing characters until the text
/// fits the budget, then strip trailing whitespace. Not a semantic
/// rewrite — callers re-validate afterwards.
pub fn enforce_limit(text: &str, limit: usize) -> String {
    let mut result: String = text.to_string();
    while display_width(&result) > limit {
        result.pop();
    }
    result.trim_end().to_string()
}
