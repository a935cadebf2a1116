/*!
 * Single in-progress caption edit.
 *
 * An `EditSession` holds at most one `DraftCaption` together with the anchor
 * the caller associates with it (a row handle, a widget id, ...). Typing only
 * touches the draft; the timeline is written once, when the edit is
 * committed with `finish(true, ..)`.
 */

use log::debug;

use crate::caption::{CaptionId, DraftCaption, StoredCaption};
use crate::errors::EditError;
use crate::markup;
use crate::timeline::CaptionTimeline;

/// Tracks the caption currently being edited
#[derive(Debug)]
pub struct EditSession<A> {
    draft: Option<DraftCaption>,
    anchor: Option<A>,
}

impl<A> Default for EditSession<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> EditSession<A> {
    pub fn new() -> Self {
        Self {
            draft: None,
            anchor: None,
        }
    }

    /// Start editing `caption`.
    ///
    /// Fails if another edit is in progress; that edit is left untouched.
    pub fn start(&mut self, caption: &StoredCaption, anchor: A) -> Result<(), EditError> {
        if let Some(draft) = &self.draft {
            return Err(EditError::AlreadyEditing(draft.source()));
        }
        debug!("Started editing caption {}", caption.id());
        self.draft = Some(caption.draft());
        self.anchor = Some(anchor);
        Ok(())
    }

    /// Replace the draft markup; returns false when nothing is being edited
    pub fn update(&mut self, markup: impl Into<String>) -> bool {
        match self.draft.as_mut() {
            Some(draft) => {
                draft.set_markup(markup);
                true
            }
            None => false,
        }
    }

    /// Whether committing the draft would change its source caption's markup.
    ///
    /// A draft whose source is no longer in the timeline counts as changed.
    pub fn changed(&self, timeline: &CaptionTimeline) -> bool {
        let Some(draft) = &self.draft else {
            return false;
        };
        match timeline.get_by_id(draft.source()) {
            Some(source) => source.markup != markup::normalize(&draft.markup),
            None => true,
        }
    }

    /// End the edit, writing the draft back when `commit` is set and it changed.
    ///
    /// The draft and anchor are always cleared. Returns whether the timeline
    /// was written.
    pub fn finish(&mut self, commit: bool, timeline: &mut CaptionTimeline) -> Result<bool, EditError> {
        let changed = self.changed(timeline);
        let draft = self.draft.take();
        self.anchor = None;

        let Some(draft) = draft else {
            return Ok(false);
        };
        if !commit {
            debug!("Discarded edit of caption {}", draft.source());
            return Ok(false);
        }
        if timeline.get_by_id(draft.source()).is_none() {
            return Err(EditError::SourceRemoved(draft.source()));
        }
        if !changed {
            return Ok(false);
        }
        timeline.set_content(draft.source(), draft.markup.clone())?;
        debug!("Committed edit of caption {}", draft.source());
        Ok(true)
    }

    /// Character counts per line of the draft, only when it has two or more lines
    pub fn line_counts(&self) -> Option<Vec<usize>> {
        self.draft
            .as_ref()
            .filter(|draft| draft.line_count() >= 2)
            .map(|draft| draft.character_count_per_line())
    }

    pub fn in_progress(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&DraftCaption> {
        self.draft.as_ref()
    }

    pub fn anchor(&self) -> Option<&A> {
        self.anchor.as_ref()
    }

    /// Whether the edit in progress is of caption `id`
    pub fn is_for(&self, id: CaptionId) -> bool {
        self.draft.as_ref().is_some_and(|draft| draft.source() == id)
    }

    /// The stored caption being edited
    pub fn stored_caption<'t>(&self, timeline: &'t CaptionTimeline) -> Option<&'t StoredCaption> {
        self.draft
            .as_ref()
            .and_then(|draft| timeline.get_by_id(draft.source()))
    }

    /// Markup of the stored caption being edited
    pub fn source_markup<'t>(&self, timeline: &'t CaptionTimeline) -> Option<&'t str> {
        self.stored_caption(timeline).map(|caption| caption.markup.as_str())
    }

    /// Markup of the draft
    pub fn current_markup(&self) -> Option<&str> {
        self.draft.as_ref().map(|draft| draft.markup.as_str())
    }
}
