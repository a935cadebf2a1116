/*!
 * Caption entity types.
 *
 * A `Caption` is the plain value shared by both flavours the editor works
 * with: a `StoredCaption` owned by the timeline and bound to a document node,
 * and a `DraftCaption` that is a detached copy being edited.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::document::NodeId;
use crate::markup;

/// Caption times are milliseconds; gap-fitting can produce fractional values.
pub type Millis = f64;

/// Time value of an unset start or end.
pub const UNSET_TIME: Millis = -1.0;

/// Display region of a caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Top,
    Bottom,
}

impl Region {
    /// Identifier used for the region in caption documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(format!("unknown region: {}", other)),
        }
    }
}

/// Kinds of readability warnings a caption can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// More lines than allowed
    Lines,
    /// Too many characters per second
    CharacterRate,
    /// Synced but shorter than the minimum duration
    Timing,
    /// A rendered line is longer than allowed
    LongLine,
}

impl WarningKind {
    pub const ALL: [WarningKind; 4] = [
        WarningKind::Lines,
        WarningKind::CharacterRate,
        WarningKind::Timing,
        WarningKind::LongLine,
    ];
}

/// Thresholds used by the readability warnings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningLimits {
    /// Maximum number of lines
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Maximum characters per second
    #[serde(default = "default_max_characters_per_second")]
    pub max_characters_per_second: f64,

    /// Minimum duration of a synced caption in milliseconds
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: Millis,

    /// Maximum characters on one rendered line
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

impl Default for WarningLimits {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            max_characters_per_second: default_max_characters_per_second(),
            min_duration_ms: default_min_duration_ms(),
            max_line_length: default_max_line_length(),
        }
    }
}

fn default_max_lines() -> usize {
    2
}

fn default_max_characters_per_second() -> f64 {
    21.0
}

fn default_min_duration_ms() -> Millis {
    700.0
}

fn default_max_line_length() -> usize {
    42
}

/// Timing, text and layout of a single caption
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// Start time in ms, `UNSET_TIME` when unsynced
    pub start_time: Millis,

    /// End time in ms, `UNSET_TIME` when unsynced
    pub end_time: Millis,

    /// Text in the caption markup format
    pub markup: String,

    /// Display region, `None` for the default placement
    pub region: Option<Region>,

    /// Whether this caption opens a new paragraph
    pub start_of_paragraph: bool,
}

impl Default for Caption {
    fn default() -> Self {
        Self {
            start_time: UNSET_TIME,
            end_time: UNSET_TIME,
            markup: String::new(),
            region: None,
            start_of_paragraph: false,
        }
    }
}

impl Caption {
    pub fn new(
        start_time: Millis,
        end_time: Millis,
        markup: impl Into<String>,
        region: Option<Region>,
        start_of_paragraph: bool,
    ) -> Self {
        Self {
            start_time,
            end_time,
            markup: markup.into(),
            region,
            start_of_paragraph,
        }
    }

    /// Both times are set
    pub fn is_synced(&self) -> bool {
        self.start_time >= 0.0 && self.end_time >= 0.0
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }

    /// Duration in ms, or `UNSET_TIME` when unsynced
    pub fn duration(&self) -> Millis {
        if self.is_synced() {
            self.end_time - self.start_time
        } else {
            UNSET_TIME
        }
    }

    /// Whether `time` falls within `[start_time, end_time)`
    pub fn is_at(&self, time: Millis) -> bool {
        self.is_synced() && self.start_time <= time && self.end_time > time
    }

    pub fn start_time_seconds(&self) -> f64 {
        if self.start_time >= 0.0 {
            self.start_time / 1000.0
        } else {
            -1.0
        }
    }

    pub fn end_time_seconds(&self) -> f64 {
        if self.end_time >= 0.0 {
            self.end_time / 1000.0
        } else {
            -1.0
        }
    }

    /// The caption text rendered as HTML
    pub fn content(&self) -> String {
        markup::to_html(&self.markup)
    }

    /// Number of visible characters; line breaks are not counted
    pub fn character_count(&self) -> usize {
        let plain = markup::to_plaintext(&self.markup);
        plain.chars().filter(|c| *c != '\n').count()
    }

    pub fn character_count_per_line(&self) -> Vec<usize> {
        markup::character_counts_per_line(&self.markup)
    }

    pub fn line_count(&self) -> usize {
        self.markup.split('\n').count()
    }

    /// Characters per second, 0.0 when unsynced or without a positive duration
    pub fn character_rate_value(&self) -> f64 {
        let duration = self.duration();
        if !self.is_synced() || duration <= 0.0 {
            return 0.0;
        }
        self.character_count() as f64 * 1000.0 / duration
    }

    /// Characters per second formatted with one decimal
    pub fn character_rate(&self) -> String {
        format!("{:.1}", self.character_rate_value())
    }

    /// Check one warning kind against the default limits
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.has_warning_with(kind, &WarningLimits::default())
    }

    /// Check one warning kind against the given limits
    pub fn has_warning_with(&self, kind: WarningKind, limits: &WarningLimits) -> bool {
        match kind {
            WarningKind::Lines => self.line_count() > limits.max_lines,
            WarningKind::CharacterRate => {
                // Compared at the displayed precision
                let rounded = (self.character_rate_value() * 10.0).round() / 10.0;
                rounded > limits.max_characters_per_second
            }
            WarningKind::Timing => {
                self.start_time > -1.0
                    && self.end_time > -1.0
                    && self.end_time - self.start_time < limits.min_duration_ms
            }
            WarningKind::LongLine => self
                .character_count_per_line()
                .iter()
                .any(|count| *count > limits.max_line_length),
        }
    }

    /// Whether any warning kind applies
    pub fn has_any_warning(&self, limits: &WarningLimits) -> bool {
        WarningKind::ALL
            .iter()
            .any(|kind| self.has_warning_with(*kind, limits))
    }

    /// Whether the line at `index` is too long
    pub fn has_warning_on_line(&self, index: usize, limits: &WarningLimits) -> bool {
        self.character_count_per_line()
            .get(index)
            .is_some_and(|count| *count > limits.max_line_length)
    }
}

/// Identifier of a stored caption, unique for the lifetime of its timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptionId(u64);

impl CaptionId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for CaptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for CaptionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Self)
    }
}

/// A caption owned by a timeline and bound to a document node.
///
/// Read access goes through `Deref<Target = Caption>`; changes are made
/// with the timeline's update methods so the document stays in step.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCaption {
    id: CaptionId,
    node: NodeId,
    pub(crate) caption: Caption,
}

impl StoredCaption {
    pub(crate) fn new(id: CaptionId, node: NodeId, caption: Caption) -> Self {
        Self { id, node, caption }
    }

    pub fn id(&self) -> CaptionId {
        self.id
    }

    /// Handle of the backing document node
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn caption(&self) -> &Caption {
        &self.caption
    }

    /// Detached copy that can be edited without touching the document
    pub fn draft(&self) -> DraftCaption {
        DraftCaption {
            source: self.id,
            caption: self.caption.clone(),
        }
    }
}

impl Deref for StoredCaption {
    type Target = Caption;

    fn deref(&self) -> &Caption {
        &self.caption
    }
}

/// A caption being edited, detached from the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct DraftCaption {
    source: CaptionId,
    caption: Caption,
}

impl DraftCaption {
    /// Id of the stored caption this draft was taken from
    pub fn source(&self) -> CaptionId {
        self.source
    }

    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.caption.markup = markup.into();
    }

    pub fn caption(&self) -> &Caption {
        &self.caption
    }
}

impl Deref for DraftCaption {
    type Target = Caption;

    fn deref(&self) -> &Caption {
        &self.caption
    }
}
