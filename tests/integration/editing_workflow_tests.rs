/*!
 * Integration tests for editing sessions over a loaded timeline
 */

use anyhow::Result;
use subedit::caption::{Region, WarningKind, WarningLimits};
use subedit::{CaptionTimeline, Change, EditSession};

use crate::common;

/// Test a transcription pass: type every caption, then sync the new ones
#[test]
fn test_transcribeAndSync_shouldCompleteTimeline() -> Result<()> {
    let mut timeline = CaptionTimeline::new();
    timeline.load_empty("en")?;
    let batches = common::record_changes(&mut timeline);
    let mut session = EditSession::new();

    for (row, text) in ["Hello there", "General Kenobi", "You are a bold one"].iter().enumerate() {
        let id = timeline.insert_before(None, None)?;
        let caption = timeline.get_by_id(id).unwrap().clone();
        session.start(&caption, row)?;
        session.update(*text);
        assert!(session.finish(true, &mut timeline)?);
    }
    assert!(!timeline.is_complete());
    assert!(timeline.needs_any_transcribed().is_none());

    let ids: Vec<_> = timeline.captions().iter().map(|c| c.id()).collect();
    for (i, id) in ids.iter().enumerate() {
        let start = 1000.0 * (2 * i) as f64;
        timeline.retime(*id, Some(start), Some(start + 1500.0))?;
    }

    assert!(timeline.is_complete());
    assert!(timeline.first_invalid_timing().is_none());
    assert_eq!(timeline.synced_count(), 3);
    assert_eq!(timeline.caption_at(2200.0).map(|c| c.markup.as_str()), Some("General Kenobi"));
    // insert + commit per caption, then one update per retime
    assert_eq!(batches.borrow().len(), 9);
    common::assert_timeline_consistent(&timeline);
    Ok(())
}

/// Test that splitting during playback keeps lookups working
#[test]
fn test_splitDuringPlayback_shouldUpdateCaptionAt() -> Result<()> {
    let text = common::dfxp_document("en", &[(0.0, 4000.0, "one two"), (4000.0, 6000.0, "three")]);
    let mut timeline = CaptionTimeline::new();
    timeline.load(&text)?;
    let first = timeline.captions()[0].id();

    let second = timeline.split(first, "one", "two")?;

    assert_eq!(timeline.caption_at(1000.0).map(|c| c.id()), Some(first));
    assert_eq!(timeline.caption_at(2000.0).map(|c| c.id()), Some(second));
    assert_eq!(timeline.caption_at(4000.0).map(|c| c.markup.as_str()), Some("three"));
    let overlapping: Vec<_> = timeline
        .captions_overlapping(1500.0, 4500.0)
        .into_iter()
        .map(|c| c.markup.clone())
        .collect();
    assert_eq!(overlapping, vec!["one", "two", "three"]);
    Ok(())
}

/// Test that warnings follow edits
#[test]
fn test_warnings_shouldFollowDraftAndCommittedText() -> Result<()> {
    let mut timeline = common::timeline_with_spans(&[(0.0, 1000.0)]);
    let id = timeline.captions()[0].id();
    let limits = WarningLimits::default();
    assert!(!timeline.captions()[0].has_any_warning(&limits));

    let mut session = EditSession::new();
    session.start(&timeline.captions()[0], ())?;
    session.update("first line\nsecond line\nthird line");
    let draft = session.draft().map(|d| d.caption().clone());
    assert!(draft.is_some_and(|c| c.has_warning(WarningKind::Lines)));
    session.finish(true, &mut timeline)?;

    let stored = timeline.get_by_id(id).map(|c| c.caption().clone());
    assert!(stored.as_ref().is_some_and(|c| c.has_warning(WarningKind::Lines)));
    assert!(stored.as_ref().is_some_and(|c| c.has_warning(WarningKind::CharacterRate)));
    assert!(!stored.as_ref().is_some_and(|c| c.has_warning(WarningKind::Timing)));
    Ok(())
}

/// Test that a listener can mirror the timeline from change batches alone
#[test]
fn test_changeBatches_shouldLetListenerMirrorOrder() -> Result<()> {
    let mut timeline = common::timeline_with_spans(&[(0.0, 1000.0), (4000.0, 5000.0)]);
    let batches = common::record_changes(&mut timeline);
    let mut mirror: Vec<_> = timeline.captions().iter().map(|c| c.id()).collect();

    let second = timeline.captions()[1].id();
    let inserted = timeline.insert_before(Some(second), Some(Region::Top))?;
    timeline.split(inserted, "a", "b")?;
    timeline.remove(second)?;

    for batch in batches.borrow().iter() {
        for change in batch {
            match change {
                Change::Reload => mirror = timeline.captions().iter().map(|c| c.id()).collect(),
                Change::Insert { caption, before } => {
                    let index = before
                        .and_then(|b| mirror.iter().position(|id| *id == b))
                        .unwrap_or(mirror.len());
                    mirror.insert(index, caption.id());
                }
                Change::Update { .. } => {}
                Change::Remove { caption } => mirror.retain(|id| *id != caption.id()),
            }
        }
    }

    let actual: Vec<_> = timeline.captions().iter().map(|c| c.id()).collect();
    assert_eq!(mirror, actual);
    common::assert_timeline_consistent(&timeline);
    Ok(())
}
