use log::{debug, warn};

use crate::caption::{CaptionId, Millis, Region};
use crate::document::NodeAttrs;
use crate::errors::TimelineError;
use crate::markup;

use super::changes::Change;
use super::list::CaptionTimeline;

// @module: Timeline mutations

/// Fields to change on a caption; `None` leaves a field as it is
#[derive(Debug, Default, Clone)]
pub(crate) struct CaptionUpdate {
    pub(crate) start_time: Option<Millis>,
    pub(crate) end_time: Option<Millis>,
    pub(crate) markup: Option<String>,
    pub(crate) region: Option<Option<Region>>,
    pub(crate) start_of_paragraph: Option<bool>,
}

impl CaptionTimeline {
    /// Change the times of a caption; `None` keeps the current value.
    ///
    /// Inconsistent timings are stored as given and reported by
    /// `first_invalid_timing`.
    pub fn retime(
        &mut self,
        id: CaptionId,
        start_time: Option<Millis>,
        end_time: Option<Millis>,
    ) -> Result<(), TimelineError> {
        let index = self.require_index(id)?;
        self.update_caption(
            index,
            CaptionUpdate {
                start_time,
                end_time,
                ..Default::default()
            },
        )?;
        self.changes.flush();
        Ok(())
    }

    /// Replace the markup of a caption.
    ///
    /// Markup is stored the way a reloaded document reads it back: every
    /// line trimmed and no surrounding blank lines.
    pub fn set_content(&mut self, id: CaptionId, markup: impl Into<String>) -> Result<(), TimelineError> {
        let index = self.require_index(id)?;
        self.update_caption(
            index,
            CaptionUpdate {
                markup: Some(markup.into()),
                ..Default::default()
            },
        )?;
        self.changes.flush();
        Ok(())
    }

    /// Set the paragraph flag, or toggle it when `value` is `None`
    pub fn set_paragraph_start(&mut self, id: CaptionId, value: Option<bool>) -> Result<(), TimelineError> {
        let index = self.require_index(id)?;
        let value = value.unwrap_or(!self.captions[index].start_of_paragraph);
        self.update_caption(
            index,
            CaptionUpdate {
                start_of_paragraph: Some(value),
                ..Default::default()
            },
        )?;
        self.changes.flush();
        Ok(())
    }

    pub fn set_region(&mut self, id: CaptionId, region: Option<Region>) -> Result<(), TimelineError> {
        let index = self.require_index(id)?;
        self.update_caption(
            index,
            CaptionUpdate {
                region: Some(region),
                ..Default::default()
            },
        )?;
        self.changes.flush();
        Ok(())
    }

    /// Insert a blank caption before `other`, or at the end when `other` is `None`.
    ///
    /// When `other` is synced the new caption is timed into the space before
    /// it, shortening its neighbour when that space is smaller than the
    /// default duration.
    pub fn insert_before(
        &mut self,
        other: Option<CaptionId>,
        region: Option<Region>,
    ) -> Result<CaptionId, TimelineError> {
        let next_index = match other {
            Some(id) => Some(self.require_index(id)?),
            None => None,
        };

        let mut attrs = NodeAttrs {
            region,
            ..Default::default()
        };
        if let Some(next_index) = next_index.filter(|i| self.captions[*i].is_synced()) {
            let (begin, end) = self.fit_into_gap(next_index)?;
            attrs.begin = begin;
            attrs.end = end;
        }

        // The neighbour may have moved while making room
        let preferred = other
            .and_then(|id| self.index_of(id))
            .unwrap_or(self.captions.len());
        let index = self.sorted_insertion_index(preferred, attrs.begin, attrs.end);
        let id = self.insert_recorded(index, attrs, "")?;
        debug!("Inserted caption {} at {}", id, index);
        self.changes.flush();
        Ok(id)
    }

    /// Work out `(begin, end)` for a caption going in front of the synced caption at `next_index`
    fn fit_into_gap(&mut self, next_index: usize) -> Result<(Millis, Millis), TimelineError> {
        let duration = self.default_duration;
        let next_start = self.captions[next_index].start_time;
        let next_end = self.captions[next_index].end_time;

        if next_index > 0 {
            let prev_start = self.captions[next_index - 1].start_time;
            let prev_end = self.captions[next_index - 1].end_time;
            let gap = next_start - prev_end;
            if gap >= duration {
                let begin = prev_end + (gap - duration) / 2.0;
                return Ok((begin, begin + duration));
            }
            let begin = (next_start - duration).max((prev_start + next_start) / 2.0);
            self.update_caption(
                next_index - 1,
                CaptionUpdate {
                    end_time: Some(begin),
                    ..Default::default()
                },
            )?;
            return Ok((begin, next_start));
        }

        if next_start >= duration {
            let begin = (next_start - duration) / 2.0;
            return Ok((begin, begin + duration));
        }
        let end = duration.min(next_end / 2.0);
        self.update_caption(
            next_index,
            CaptionUpdate {
                start_time: Some(end),
                ..Default::default()
            },
        )?;
        Ok((0.0, end))
    }

    /// Split a caption in two, returning the id of the second half.
    ///
    /// A synced caption is cut at the midpoint of its times; an unsynced one
    /// only has its markup divided. The second half takes the region of the
    /// original.
    pub fn split(
        &mut self,
        id: CaptionId,
        first_markup: impl Into<String>,
        second_markup: impl Into<String>,
    ) -> Result<CaptionId, TimelineError> {
        let index = self.require_index(id)?;
        let original = &self.captions[index];
        let mut attrs = NodeAttrs {
            region: original.region,
            ..Default::default()
        };
        let mut update = CaptionUpdate {
            markup: Some(first_markup.into()),
            ..Default::default()
        };
        if original.is_synced() {
            let midpoint = (original.start_time + original.end_time) / 2.0;
            attrs.begin = midpoint;
            attrs.end = original.end_time;
            update.end_time = Some(midpoint);
        }

        let index = self.update_caption(index, update)?;
        let position = self.sorted_insertion_index(index + 1, attrs.begin, attrs.end);
        let second = self.insert_recorded(position, attrs, &second_markup.into())?;
        debug!("Split caption {}, second half is {}", id, second);
        self.changes.flush();
        Ok(second)
    }

    /// Remove a caption from the timeline and its document
    pub fn remove(&mut self, id: CaptionId) -> Result<(), TimelineError> {
        let index = self.require_index(id)?;
        self.document.remove_caption(self.captions[index].node())?;
        let removed = self.captions.remove(index);
        if removed.is_synced() {
            self.synced_count -= 1;
        }
        debug!("Removed caption {}", id);
        self.changes.record(Change::Remove { caption: removed });
        self.changes.flush();
        Ok(())
    }

    /// Move every caption starting at or after `from` by `amount` ms.
    ///
    /// Returns the number of captions moved. All updates are delivered in
    /// one batch.
    pub fn shift_times(&mut self, from: Millis, amount: Millis) -> Result<usize, TimelineError> {
        let targets: Vec<CaptionId> = self.captions[..self.synced_count]
            .iter()
            .filter(|c| c.start_time >= from)
            .map(|c| c.id())
            .collect();
        for id in &targets {
            let index = self.require_index(*id)?;
            let caption = &self.captions[index];
            let update = CaptionUpdate {
                start_time: Some(caption.start_time + amount),
                end_time: Some(caption.end_time + amount),
                ..Default::default()
            };
            self.update_caption(index, update)?;
        }
        debug!("Shifted {} captions by {} ms", targets.len(), amount);
        self.changes.flush();
        Ok(targets.len())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Apply an update to the caption at `index` and record it.
    ///
    /// The document is written first. The caption is moved, in list and
    /// document, when the change breaks the synced/unsynced partition or the
    /// start-time order. Returns the caption's index afterwards.
    pub(crate) fn update_caption(&mut self, index: usize, update: CaptionUpdate) -> Result<usize, TimelineError> {
        let node = self.captions[index].node();
        let was_synced = self.captions[index].is_synced();

        let mut caption = self.captions[index].caption.clone();
        if let Some(start_time) = update.start_time {
            caption.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            caption.end_time = end_time;
        }
        if let Some(text) = update.markup {
            caption.markup = markup::normalize(&text);
        }
        if let Some(region) = update.region {
            caption.region = region;
        }
        if let Some(start_of_paragraph) = update.start_of_paragraph {
            caption.start_of_paragraph = start_of_paragraph;
        }
        let now_synced = caption.is_synced();
        if now_synced && caption.start_time >= caption.end_time {
            warn!(
                "Caption {} now starts at {} but ends at {}",
                self.captions[index].id(),
                caption.start_time,
                caption.end_time
            );
        }

        let target = self.reposition_target(index, was_synced, now_synced, caption.start_time);
        if let Some(target) = target {
            let placement = self.placement_for(target, Some(index));
            self.document.move_caption(node, placement)?;
        }

        self.document.set_start_time(node, caption.start_time)?;
        self.document.set_end_time(node, caption.end_time)?;
        self.document.set_text(node, &caption.markup)?;
        self.document.set_region(node, caption.region)?;
        self.document.set_start_of_paragraph(node, caption.start_of_paragraph)?;

        match (was_synced, now_synced) {
            (false, true) => self.synced_count += 1,
            (true, false) => self.synced_count -= 1,
            _ => {}
        }
        self.captions[index].caption = caption;

        let index = match target {
            Some(target) => {
                let stored = self.captions.remove(index);
                self.captions.insert(target, stored);
                target
            }
            None => index,
        };
        debug!("Updated caption {}", self.captions[index].id());
        self.changes.record(Change::Update {
            caption: self.captions[index].clone(),
        });
        Ok(index)
    }

    /// New index for the caption at `index` after an update, or `None` if it can stay.
    ///
    /// The returned index is in list coordinates with the caption taken out.
    fn reposition_target(&self, index: usize, was_synced: bool, now_synced: bool, start_time: Millis) -> Option<usize> {
        let synced_without = self.synced_count - usize::from(was_synced);
        match (was_synced, now_synced) {
            (true, true) => {
                let after_prev = index == 0 || self.captions[index - 1].start_time <= start_time;
                let before_next = index + 1 >= self.synced_count
                    || self.captions[index + 1].start_time >= start_time;
                if after_prev && before_next {
                    return None;
                }
                Some(self.sorted_position(synced_without, start_time, Some(index)))
            }
            (false, true) => Some(self.sorted_position(synced_without, start_time, Some(index))),
            // Becomes the first unsynced caption
            (true, false) => (index + 1 != self.synced_count).then_some(synced_without),
            (false, false) => None,
        }
    }

    /// Position after every synced caption starting at or before `start_time`
    fn sorted_position(&self, synced_len: usize, start_time: Millis, skip: Option<usize>) -> usize {
        self.captions
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .take(synced_len)
            .filter(|(_, c)| c.start_time <= start_time)
            .count()
    }

    /// Closest valid index to `preferred` for a new caption with the given times
    pub(crate) fn sorted_insertion_index(&self, preferred: usize, begin: Millis, end: Millis) -> usize {
        if begin < 0.0 || end < 0.0 {
            return preferred.clamp(self.synced_count, self.captions.len());
        }
        let synced = &self.captions[..self.synced_count];
        let lowest = synced.partition_point(|c| c.start_time < begin);
        let highest = synced.partition_point(|c| c.start_time <= begin);
        preferred.clamp(lowest, highest)
    }

    /// Insert a node at `index` and record the insert
    fn insert_recorded(&mut self, index: usize, attrs: NodeAttrs, text: &str) -> Result<CaptionId, TimelineError> {
        let index = self.insert_node(index, attrs, &markup::normalize(text))?;
        let caption = self.captions[index].clone();
        let id = caption.id();
        let before = self.captions.get(index + 1).map(|c| c.id());
        self.changes.record(Change::Insert { caption, before });
        Ok(id)
    }
}
