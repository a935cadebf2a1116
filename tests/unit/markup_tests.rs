/*!
 * Tests for caption markup rendering
 */

use subedit::markup::{character_counts_per_line, to_dfxp, to_html, to_plaintext};

/// Test nested markers
#[test]
fn test_toHtml_withBoldAndItalic_shouldNestTags() {
    assert_eq!(to_html("**bold *and* more**"), "<b>bold <i>and</i> more</b>");
}

/// Test that unmatched markers are left alone
#[test]
fn test_toPlaintext_withUnmatchedMarker_shouldKeepIt() {
    assert_eq!(to_plaintext("5 * 3"), "5 * 3");
    assert_eq!(to_plaintext("snake_case"), "snake_case");
}

/// Test DFXP rendering escapes XML characters
#[test]
fn test_toDfxp_withSpecialCharacters_shouldEscape() {
    assert_eq!(
        to_dfxp("**A & B**"),
        r#"<span tts:fontWeight="bold">A &amp; B</span>"#
    );
    assert_eq!(to_dfxp("_u_"), r#"<span tts:textDecoration="underline">u</span>"#);
}

/// Test per-line counts for an empty caption
#[test]
fn test_characterCountsPerLine_withEmptyMarkup_shouldReturnSingleZero() {
    assert_eq!(character_counts_per_line(""), vec![0]);
    assert_eq!(character_counts_per_line("a\n\nbc"), vec![1, 0, 2]);
}

/// Test that a marker crossing another span is written as text
#[test]
fn test_toDfxp_withCrossingMarkers_shouldKeepSpansNested() {
    assert_eq!(
        to_dfxp("*a **b* c**"),
        r#"<span tts:fontStyle="italic">a **b</span> c**"#
    );
    assert_eq!(to_plaintext("x *a_b* c_"), "x a_b c_");
}
