/*!
 * The caption timeline: ownership, loading and lookups.
 *
 * The list is partitioned into a prefix of synced captions sorted by start
 * time followed by the unsynced captions in insertion order. The backing
 * document always holds the same nodes in the same order.
 */

use log::{debug, info};
use std::collections::HashSet;

use crate::app_config::EditorConfig;
use crate::caption::{Caption, CaptionId, Millis, Region, StoredCaption};
use crate::document::{CaptionDocument, NodeAttrs, NodeId, Placement};
use crate::errors::{DocumentError, TimelineError};
use crate::language_utils;

use super::changes::{Change, ChangeBatch, ChangeListener, ListenerId};

/// Ordered, document-backed collection of captions
#[derive(Debug)]
pub struct CaptionTimeline {
    pub(crate) document: CaptionDocument,
    pub(crate) captions: Vec<StoredCaption>,
    pub(crate) synced_count: usize,
    next_id: u64,
    pub(crate) default_duration: Millis,
    pub(crate) changes: ChangeBatch,
}

impl Default for CaptionTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionTimeline {
    /// Create an empty timeline with the default editor settings
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    /// Create an empty timeline using the given editor settings
    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            document: CaptionDocument::empty(""),
            captions: Vec::new(),
            synced_count: 0,
            next_id: 0,
            default_duration: config.default_caption_duration_ms,
            changes: ChangeBatch::default(),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the contents with a parsed caption document.
    ///
    /// Nothing changes if the text cannot be parsed.
    pub fn load(&mut self, document_text: &str) -> Result<(), TimelineError> {
        let document = CaptionDocument::parse(document_text)?;
        self.replace_document(document)
    }

    /// Replace the contents with an empty document in the given language
    pub fn load_empty(&mut self, language_code: &str) -> Result<(), TimelineError> {
        language_utils::validate_language_code(language_code)
            .map_err(|_| TimelineError::InvalidLanguage(language_code.to_string()))?;
        self.replace_document(CaptionDocument::empty(language_code))
    }

    fn replace_document(&mut self, mut document: CaptionDocument) -> Result<(), TimelineError> {
        let mut next_id = self.next_id;
        let mut synced = Vec::new();
        let mut unsynced = Vec::new();
        for node in document.nodes() {
            let caption = read_caption(&document, node)?;
            let stored = StoredCaption::new(CaptionId::new(next_id), node, caption);
            next_id += 1;
            if stored.is_synced() {
                synced.push(stored);
            } else {
                unsynced.push(stored);
            }
        }
        synced.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let synced_count = synced.len();
        let mut captions = synced;
        captions.extend(unsynced);

        let order: Vec<NodeId> = captions.iter().map(|c| c.node()).collect();
        document.reorder(&order)?;

        self.document = document;
        self.captions = captions;
        self.synced_count = synced_count;
        self.next_id = next_id;
        info!(
            "Loaded {} captions ({} synced)",
            self.captions.len(),
            self.synced_count
        );
        self.changes.record(Change::Reload);
        self.changes.flush();
        Ok(())
    }

    /// Add blank synced captions carrying the timing of another document.
    ///
    /// Captions of the other document without both times are skipped. Each
    /// new caption goes to its sorted place in the synced prefix, which is the
    /// end of the list when seeding an empty timeline.
    pub fn import_timings_from(&mut self, other_document_text: &str) -> Result<usize, TimelineError> {
        let base = CaptionDocument::parse(other_document_text)?;
        let mut timings = Vec::new();
        for node in base.nodes() {
            let start_time = base.start_time(node)?;
            let end_time = base.end_time(node)?;
            if start_time >= 0.0 && end_time >= 0.0 {
                timings.push(NodeAttrs {
                    begin: start_time,
                    end: end_time,
                    region: base.region(node)?,
                    start_of_paragraph: base.start_of_paragraph(node)?,
                });
            }
        }
        timings.sort_by(|a, b| a.begin.total_cmp(&b.begin));

        let count = timings.len();
        for attrs in timings {
            let index = self.captions[..self.synced_count].partition_point(|c| c.start_time <= attrs.begin);
            self.insert_node(index, attrs, "")?;
        }
        debug!("Imported {} caption timings", count);
        self.changes.record(Change::Reload);
        self.changes.flush();
        Ok(count)
    }

    /// Add a node at `index` in both document and list; returns the new caption's index
    pub(crate) fn insert_node(
        &mut self,
        index: usize,
        attrs: NodeAttrs,
        markup: &str,
    ) -> Result<usize, TimelineError> {
        let placement = self.placement_for(index, None);
        let node = self.document.add_caption(placement, attrs, markup)?;
        let caption = read_caption(&self.document, node)?;
        let stored = StoredCaption::new(self.next_caption_id(), node, caption);
        if stored.is_synced() {
            self.synced_count += 1;
        }
        self.captions.insert(index, stored);
        Ok(index)
    }

    /// Document placement matching list position `index`, ignoring the caption at `skip`
    pub(crate) fn placement_for(&self, index: usize, skip: Option<usize>) -> Placement {
        if index == 0 {
            return Placement::Front;
        }
        let before = match skip {
            Some(skipped) if index > skipped => index,
            _ => index - 1,
        };
        Placement::After(self.captions[before].node())
    }

    fn next_caption_id(&mut self) -> CaptionId {
        let id = CaptionId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a listener for change batches
    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: ChangeListener + 'static,
    {
        self.changes.subscribe(Box::new(listener))
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.changes.unsubscribe(id)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// All captions in list order
    pub fn captions(&self) -> &[StoredCaption] {
        &self.captions
    }

    /// Number of captions in the synced prefix
    pub fn synced_count(&self) -> usize {
        self.synced_count
    }

    /// The backing document
    pub fn document(&self) -> &CaptionDocument {
        &self.document
    }

    pub fn language(&self) -> &str {
        self.document.language()
    }

    /// Serialize the current state as DFXP
    pub fn to_document_text(&self) -> String {
        self.document.to_xml_string()
    }

    pub fn index_of(&self, id: CaptionId) -> Option<usize> {
        self.captions.iter().position(|c| c.id() == id)
    }

    pub(crate) fn require_index(&self, id: CaptionId) -> Result<usize, TimelineError> {
        self.index_of(id).ok_or(TimelineError::UnknownCaption(id))
    }

    pub fn get_by_id(&self, id: CaptionId) -> Option<&StoredCaption> {
        self.captions.iter().find(|c| c.id() == id)
    }

    /// Caption after `id` in list order
    pub fn next_of(&self, id: CaptionId) -> Option<&StoredCaption> {
        self.index_of(id).and_then(|i| self.captions.get(i + 1))
    }

    /// Caption before `id` in list order
    pub fn prev_of(&self, id: CaptionId) -> Option<&StoredCaption> {
        match self.index_of(id) {
            Some(i) if i > 0 => self.captions.get(i - 1),
            _ => None,
        }
    }

    /// Region as recorded in the document
    pub fn region_of(&self, id: CaptionId) -> Result<Option<Region>, TimelineError> {
        let index = self.require_index(id)?;
        Ok(self.document.region(self.captions[index].node())?)
    }

    /// Paragraph flag as recorded in the document
    pub fn start_of_paragraph_of(&self, id: CaptionId) -> Result<bool, TimelineError> {
        let index = self.require_index(id)?;
        Ok(self.document.start_of_paragraph(self.captions[index].node())?)
    }

    // =========================================================================
    // Completeness
    // =========================================================================

    /// First caption in list order without text
    pub fn needs_any_transcribed(&self) -> Option<&StoredCaption> {
        self.captions.iter().find(|c| c.is_empty())
    }

    pub fn needs_any_synced(&self) -> bool {
        self.synced_count < self.len()
    }

    pub fn is_complete(&self) -> bool {
        !self.is_empty() && self.needs_any_transcribed().is_none() && !self.needs_any_synced()
    }

    /// First caption with a timing problem.
    ///
    /// Checked in order: a negative time, then start not before end, then a
    /// start time already used by an earlier caption in list order.
    pub fn first_invalid_timing(&self) -> Option<&StoredCaption> {
        if let Some(caption) = self
            .captions
            .iter()
            .find(|c| c.start_time < 0.0 || c.end_time < 0.0)
        {
            return Some(caption);
        }
        if let Some(caption) = self.captions.iter().find(|c| c.start_time >= c.end_time) {
            return Some(caption);
        }
        let mut seen = HashSet::new();
        // Adding 0.0 folds -0.0 into 0.0
        self.captions
            .iter()
            .find(|c| !seen.insert((c.start_time + 0.0).to_bits()))
    }

    // =========================================================================
    // Time lookups
    // =========================================================================

    /// Index of the first synced caption ending after `time`
    pub fn index_of_first_synced_after(&self, time: Millis) -> Option<usize> {
        let synced = &self.captions[..self.synced_count];
        let last = synced.last()?;
        if last.end_time <= time {
            return None;
        }
        let (mut left, mut right) = (0, synced.len() - 1);
        while left < right {
            let middle = (left + right) / 2;
            if synced[middle].end_time > time {
                right = middle;
            } else {
                left = middle + 1;
            }
        }
        Some(left)
    }

    /// Earliest synced caption, or the first unsynced one if none are synced
    pub fn first_caption(&self) -> Option<&StoredCaption> {
        self.index_of_first_synced_after(-1.0)
            .map(|i| &self.captions[i])
            .or_else(|| self.first_unsynced_caption())
    }

    pub fn last_caption(&self) -> Option<&StoredCaption> {
        self.captions.last()
    }

    pub fn last_synced_caption(&self) -> Option<&StoredCaption> {
        match self.synced_count {
            0 => None,
            n => self.captions.get(n - 1),
        }
    }

    pub fn first_unsynced_caption(&self) -> Option<&StoredCaption> {
        self.captions.get(self.synced_count)
    }

    pub fn second_unsynced_caption(&self) -> Option<&StoredCaption> {
        self.captions.get(self.synced_count + 1)
    }

    /// Synced caption whose `[start, end)` contains `time`
    pub fn caption_at(&self, time: Millis) -> Option<&StoredCaption> {
        let index = self.index_of_first_synced_after(time)?;
        let caption = &self.captions[index];
        caption.is_at(time).then_some(caption)
    }

    /// Synced captions in order that overlap `[start_time, end_time)`
    pub fn captions_overlapping(&self, start_time: Millis, end_time: Millis) -> Vec<&StoredCaption> {
        let Some(first) = self.index_of_first_synced_after(start_time) else {
            return Vec::new();
        };
        self.captions[first..self.synced_count]
            .iter()
            .take_while(|c| c.start_time < end_time)
            .collect()
    }
}

/// Build a caption value from a document node
pub(crate) fn read_caption(document: &CaptionDocument, node: NodeId) -> Result<Caption, DocumentError> {
    Ok(Caption::new(
        document.start_time(node)?,
        document.end_time(node)?,
        document.text(node)?,
        document.region(node)?,
        document.start_of_paragraph(node)?,
    ))
}
