/*!
 * Loading caption versions from disk.
 *
 * A `SubtitleVersion` pairs a timeline with what is known about the version
 * it holds: language, version number, title, description and the metadata
 * found in the document head. Files are read asynchronously; parsing and
 * loading into the timeline are synchronous.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use crate::app_config::EditorConfig;
use crate::timeline::CaptionTimeline;

// @const: Metadata element in a DFXP head
static METADATA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<ttm:(\w+)>([^<]*)</ttm:\w+>").unwrap());

/// Where a version is in its loading lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet
    Waiting,
    /// A load is running
    Loading,
    /// The timeline holds the version
    Loaded,
}

/// One language version of a caption set
#[derive(Debug)]
pub struct SubtitleVersion {
    // @field: Language code of the version
    pub language: String,
    // @field: Version number, None for a new unsaved version
    pub version_number: Option<u32>,
    pub title: String,
    pub description: String,
    // @field: Every ttm:* element of the head, by local name
    pub metadata: BTreeMap<String, String>,
    state: LoadState,
    timeline: CaptionTimeline,
}

impl SubtitleVersion {
    pub fn new(language: impl Into<String>, editor: &EditorConfig) -> Self {
        Self {
            language: language.into(),
            version_number: None,
            title: String::new(),
            description: String::new(),
            metadata: BTreeMap::new(),
            state: LoadState::Waiting,
            timeline: CaptionTimeline::with_config(editor),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn timeline(&self) -> &CaptionTimeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut CaptionTimeline {
        &mut self.timeline
    }

    /// Load a version from document text already in memory
    pub fn load_text(&mut self, text: &str, version_number: Option<u32>) -> Result<()> {
        let previous = self.state;
        self.state = LoadState::Loading;
        if let Err(e) = self.timeline.load(text) {
            self.state = previous;
            return Err(e).context("Failed to load caption document");
        }
        self.version_number = version_number;
        self.read_metadata();
        if !self.timeline.language().is_empty() {
            self.language = self.timeline.language().to_string();
        }
        self.state = LoadState::Loaded;
        Ok(())
    }

    /// Read a caption document from disk and load it
    pub async fn load_from_path<P: AsRef<Path>>(&mut self, path: P, version_number: Option<u32>) -> Result<()> {
        let path = path.as_ref();
        let previous = self.state;
        self.state = LoadState::Loading;
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                self.state = previous;
                return Err(e).with_context(|| format!("Failed to read caption file: {:?}", path));
            }
        };
        self.load_text(&text, version_number)
            .with_context(|| format!("Failed to load caption file: {:?}", path))?;
        info!("Loaded {:?} ({} captions)", path, self.timeline.len());
        Ok(())
    }

    /// Start a new empty version, seeded with the timing of a base document if given.
    ///
    /// Returns the number of captions seeded.
    pub async fn init_empty<P: AsRef<Path>>(&mut self, base: Option<P>) -> Result<usize> {
        let base_text = match base {
            Some(path) => {
                let path = path.as_ref();
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read base caption file: {:?}", path))?;
                Some(text)
            }
            None => None,
        };

        self.state = LoadState::Loading;
        let seeded = self.seed(base_text.as_deref());
        match seeded {
            Ok(count) => {
                self.version_number = None;
                self.read_metadata();
                self.state = LoadState::Loaded;
                debug!("Initialised empty {} version with {} captions", self.language, count);
                Ok(count)
            }
            Err(e) => {
                self.state = LoadState::Waiting;
                Err(e)
            }
        }
    }

    fn seed(&mut self, base_text: Option<&str>) -> Result<usize> {
        self.timeline
            .load_empty(&self.language)
            .with_context(|| format!("Cannot create an empty {} version", self.language))?;
        match base_text {
            Some(text) => self
                .timeline
                .import_timings_from(text)
                .context("Failed to import timings from base document"),
            None => Ok(0),
        }
    }

    fn read_metadata(&mut self) {
        self.metadata = METADATA_REGEX
            .captures_iter(&self.timeline.document().head)
            .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
            .collect();
        self.title = self.metadata.get("title").cloned().unwrap_or_default();
        self.description = self.metadata.get("description").cloned().unwrap_or_default();
    }
}
