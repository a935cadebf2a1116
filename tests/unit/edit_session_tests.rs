/*!
 * Tests for the single-draft edit session
 */

use subedit::errors::EditError;
use subedit::EditSession;

use crate::common;

/// Test the idle session
#[test]
fn test_newSession_shouldBeIdle() {
    let timeline = common::timeline_with_spans(&[(0.0, 1000.0)]);
    let session: EditSession<usize> = EditSession::default();

    assert!(!session.in_progress());
    assert!(session.draft().is_none());
    assert!(session.current_markup().is_none());
    assert!(session.stored_caption(&timeline).is_none());
    assert!(!session.changed(&timeline));
}

/// Test that updating an idle session is refused
#[test]
fn test_update_withoutDraft_shouldReturnFalse() {
    let mut session: EditSession<()> = EditSession::new();
    assert!(!session.update("text"));
    assert!(!session.in_progress());
}

/// Test that the draft keeps the source timing
#[test]
fn test_start_shouldCopyCaptionIntoDraft() {
    let timeline = common::timeline_with_spans(&[(1000.0, 2500.0)]);
    let source = &timeline.captions()[0];
    let mut session = EditSession::new();
    session.start(source, 3usize).unwrap();

    let draft = session.draft().unwrap();
    assert_eq!(draft.source(), source.id());
    assert_eq!((draft.start_time, draft.end_time), (1000.0, 2500.0));
    assert_eq!(draft.markup, "sub1");
    assert_eq!(session.anchor(), Some(&3));
    assert_eq!(session.stored_caption(&timeline).map(|c| c.id()), Some(source.id()));
}

/// Test the full edit cycle across two captions
#[test]
fn test_editCycle_shouldCommitEachCaptionInTurn() {
    let mut timeline = common::timeline_with_spans(&[(0.0, 1000.0), (1000.0, 2000.0)]);
    let first = timeline.captions()[0].id();
    let second = timeline.captions()[1].id();
    let batches = common::record_changes(&mut timeline);
    let mut session = EditSession::new();

    session.start(&timeline.captions()[0], "first").unwrap();
    session.update("Hello");
    let blocked = session.start(&timeline.captions()[1], "second");
    assert_eq!(blocked, Err(EditError::AlreadyEditing(first)));
    assert_eq!(session.finish(true, &mut timeline), Ok(true));

    session.start(&timeline.captions()[1], "second").unwrap();
    assert!(session.is_for(second));
    assert!(!session.is_for(first));
    session.update("World");
    assert_eq!(session.finish(true, &mut timeline), Ok(true));

    let markups: Vec<&str> = timeline.captions().iter().map(|c| c.markup.as_str()).collect();
    assert_eq!(markups, vec!["Hello", "World"]);
    assert_eq!(batches.borrow().len(), 2);
}

/// Test that a discarded edit leaves no trace
#[test]
fn test_finish_withoutCommit_shouldNotNotify() {
    let mut timeline = common::timeline_with_spans(&[(0.0, 1000.0)]);
    let batches = common::record_changes(&mut timeline);
    let mut session = EditSession::new();

    session.start(&timeline.captions()[0], ()).unwrap();
    session.update("discarded");
    assert_eq!(session.finish(false, &mut timeline), Ok(false));

    assert_eq!(timeline.captions()[0].markup, "sub1");
    assert!(batches.borrow().is_empty());
    assert!(!session.in_progress());
}

/// Test finishing with nothing open
#[test]
fn test_finish_withoutDraft_shouldDoNothing() {
    let mut timeline = common::timeline_with_spans(&[(0.0, 1000.0)]);
    let mut session: EditSession<()> = EditSession::new();
    assert_eq!(session.finish(true, &mut timeline), Ok(false));
}

/// Test that the draft follows a caption that moved
#[test]
fn test_finish_afterSourceMoved_shouldWriteToSameCaption() {
    let mut timeline = common::timeline_with_spans(&[(0.0, 1000.0), (2000.0, 3000.0)]);
    let first = timeline.captions()[0].id();
    let mut session = EditSession::new();
    session.start(&timeline.captions()[0], ()).unwrap();

    timeline.retime(first, Some(5000.0), Some(6000.0)).unwrap();
    session.update("moved");
    assert_eq!(session.finish(true, &mut timeline), Ok(true));

    assert_eq!(timeline.index_of(first), Some(1));
    assert_eq!(timeline.get_by_id(first).map(|c| c.markup.as_str()), Some("moved"));
}

/// Test the per-line character counts
#[test]
fn test_lineCounts_withTwoLines_shouldCountRenderedCharacters() {
    let timeline = common::timeline_with_spans(&[(0.0, 1000.0)]);
    let mut session = EditSession::new();
    session.start(&timeline.captions()[0], ()).unwrap();

    session.update("*Hi* there\n_you_");
    assert_eq!(session.line_counts(), Some(vec![8, 3]));
    session.update("one line");
    assert!(session.line_counts().is_none());
}
