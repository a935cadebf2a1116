/*!
 * Tests for the caption entity and its derived metrics
 */

use subedit::caption::{Caption, Region, WarningKind, WarningLimits, UNSET_TIME};

/// Test derived values of a synced caption
#[test]
fn test_caption_withSyncedTimes_shouldDeriveMetrics() {
    let caption = Caption::new(1000.0, 3000.0, "*Hello* there\nfriend", Some(Region::Top), true);

    assert!(caption.is_synced());
    assert!(!caption.is_empty());
    assert_eq!(caption.duration(), 2000.0);
    assert_eq!(caption.start_time_seconds(), 1.0);
    assert_eq!(caption.end_time_seconds(), 3.0);
    assert_eq!(caption.character_count(), 17);
    assert_eq!(caption.character_rate(), "8.5");
    assert_eq!(caption.content(), "<i>Hello</i> there<br>friend");
}

/// Test that an unset start keeps the caption unsynced
#[test]
fn test_caption_withOnlyEndTime_shouldBeUnsynced() {
    let caption = Caption::new(UNSET_TIME, 2000.0, "text", None, false);

    assert!(!caption.is_synced());
    assert_eq!(caption.duration(), UNSET_TIME);
    assert_eq!(caption.start_time_seconds(), -1.0);
    assert!(!caption.is_at(1000.0));
    assert!(!caption.has_warning(WarningKind::Timing));
}

/// Test the default caption
#[test]
fn test_caption_default_shouldBeBlankAndUnsynced() {
    let caption = Caption::default();
    assert!(caption.is_empty());
    assert!(!caption.is_synced());
    assert_eq!(caption.region, None);
    assert!(!caption.start_of_paragraph);
    assert_eq!(caption.line_count(), 1);
}

/// Test that a zero-length synced caption reports a zero rate
#[test]
fn test_caption_withZeroDuration_shouldReportZeroRate() {
    let caption = Caption::new(1000.0, 1000.0, "words", None, false);
    assert_eq!(caption.character_rate_value(), 0.0);
    assert!(caption.has_warning(WarningKind::Timing));
}

/// Test the rate warning threshold at the displayed precision
#[test]
fn test_caption_rateWarning_shouldCompareRoundedRate() {
    // 21 characters in one second reads as 21.0 and is allowed
    let at_limit = Caption::new(0.0, 1000.0, "x".repeat(21), None, false);
    assert!(!at_limit.has_warning(WarningKind::CharacterRate));

    // 21.008 characters per second displays as 21.0
    let rounded_down = Caption::new(0.0, 952.0, "x".repeat(20), None, false);
    assert_eq!(rounded_down.character_rate(), "21.0");
    assert!(!rounded_down.has_warning(WarningKind::CharacterRate));
}

/// Test custom limits
#[test]
fn test_caption_warnings_withCustomLimits_shouldUseThem() {
    let limits = WarningLimits {
        max_lines: 3,
        max_characters_per_second: 10.0,
        min_duration_ms: 2000.0,
        max_line_length: 5,
    };
    let caption = Caption::new(0.0, 1500.0, "abcdef\nb\nc", None, false);

    assert!(!caption.has_warning_with(WarningKind::Lines, &limits));
    assert!(caption.has_warning_with(WarningKind::Timing, &limits));
    assert!(caption.has_warning_with(WarningKind::LongLine, &limits));
    assert!(caption.has_warning_on_line(0, &limits));
    assert!(!caption.has_warning_on_line(1, &limits));
    assert!(caption.has_any_warning(&limits));
    assert!(!Caption::new(0.0, 5000.0, "ok", None, false).has_any_warning(&limits));
}

/// Test region parsing and display
#[test]
fn test_region_fromStr_shouldMatchDocumentNames() {
    assert_eq!("top".parse::<Region>().unwrap(), Region::Top);
    assert_eq!("bottom".parse::<Region>().unwrap(), Region::Bottom);
    assert!("middle".parse::<Region>().is_err());
    assert_eq!(Region::Top.to_string(), "top");
}
