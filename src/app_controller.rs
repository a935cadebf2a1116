use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::caption::{CaptionId, Millis, WarningKind};
use crate::document::parse_clock_time;
use crate::file_utils::{FileManager, FileType};
use crate::language_utils;
use crate::loader::SubtitleVersion;

// @module: Application controller for caption file workflows

/// Result of checking a caption file
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub language: String,
    pub caption_count: usize,
    pub synced_count: usize,
    pub complete: bool,
    // @field: 1-based position of the first caption without text
    pub first_untranscribed: Option<usize>,
    // @field: 1-based position of the first caption with a timing problem
    pub first_invalid_timing: Option<usize>,
    pub warnings: Vec<CaptionWarnings>,
}

impl CheckReport {
    /// Whether the file is unfinished or has a timing problem
    pub fn has_problems(&self) -> bool {
        !self.complete || self.first_invalid_timing.is_some()
    }
}

/// Warnings raised by one caption
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionWarnings {
    // @field: 1-based position in the timeline
    pub position: usize,
    pub start_time: Millis,
    pub kinds: Vec<WarningKind>,
}

/// Main application controller for caption files
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn open_version(&self, path: &Path) -> Result<SubtitleVersion> {
        if !FileManager::file_exists(path) {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }
        if FileManager::detect_file_type(path)? == FileType::Unknown {
            warn!("{:?} does not look like a DFXP caption file, trying anyway", path);
        }
        let mut version = SubtitleVersion::new(&self.config.default_language, &self.config.editor);
        version.load_from_path(path, None).await?;
        Ok(version)
    }

    /// Load a caption file and report completeness, timing problems and warnings
    pub async fn check(&self, input_file: &Path) -> Result<CheckReport> {
        let version = self.open_version(input_file).await?;
        let timeline = version.timeline();
        let position_of = |id: CaptionId| timeline.index_of(id).map(|i| i + 1);

        let warnings: Vec<CaptionWarnings> = timeline
            .captions()
            .iter()
            .enumerate()
            .filter_map(|(index, caption)| {
                let kinds: Vec<WarningKind> = WarningKind::ALL
                    .into_iter()
                    .filter(|kind| caption.has_warning_with(*kind, &self.config.warnings))
                    .collect();
                (!kinds.is_empty()).then(|| CaptionWarnings {
                    position: index + 1,
                    start_time: caption.start_time,
                    kinds,
                })
            })
            .collect();

        let report = CheckReport {
            language: version.language.clone(),
            caption_count: timeline.len(),
            synced_count: timeline.synced_count(),
            complete: timeline.is_complete(),
            first_untranscribed: timeline.needs_any_transcribed().and_then(|c| position_of(c.id())),
            first_invalid_timing: timeline.first_invalid_timing().and_then(|c| position_of(c.id())),
            warnings,
        };
        self.log_report(input_file, &report);
        Ok(report)
    }

    fn log_report(&self, input_file: &Path, report: &CheckReport) {
        let language_name = language_utils::get_language_name(&report.language)
            .unwrap_or_else(|_| "unknown language".to_string());
        info!("{:?}: {} ({})", input_file, language_name, report.language);
        info!(
            "{} captions, {} synced, {}",
            report.caption_count,
            report.synced_count,
            if report.complete { "complete" } else { "incomplete" }
        );
        if let Some(position) = report.first_untranscribed {
            warn!("Caption {} has no text", position);
        }
        if let Some(position) = report.first_invalid_timing {
            warn!("Caption {} has invalid timing", position);
        }
        for caption in &report.warnings {
            warn!(
                "Caption {} at {}: {:?}",
                caption.position,
                Self::format_timestamp(caption.start_time),
                caption.kinds
            );
        }
    }

    /// Shift caption times in a file and write the result.
    ///
    /// `from` is a `H:MM:SS.mmm` clock time; only captions starting at or
    /// after it move. Returns the path written and the number of captions
    /// moved.
    pub async fn shift(
        &self,
        input_file: &Path,
        amount_ms: Millis,
        from: Option<&str>,
        backward: bool,
        output_file: Option<PathBuf>,
    ) -> Result<(PathBuf, usize)> {
        let from_ms = match from {
            Some(text) => parse_clock_time(text)
                .ok_or_else(|| anyhow!("Invalid start time '{}', expected H:MM:SS.mmm", text))?,
            None => 0.0,
        };
        if amount_ms < 0.0 {
            return Err(anyhow!("Shift amount must not be negative, use --backward instead"));
        }
        let amount = if backward { -amount_ms } else { amount_ms };

        let mut version = self.open_version(input_file).await?;
        let moved = version
            .timeline_mut()
            .shift_times(from_ms, amount)
            .context("Failed to shift caption times")?;
        if backward && version.timeline().needs_any_synced() {
            warn!("Some captions moved before the start and are no longer synced");
        }

        let output_file = output_file.unwrap_or_else(|| {
            let dir = input_file.parent().unwrap_or(Path::new("."));
            FileManager::generate_output_path(input_file, dir, "shifted", "dfxp")
        });
        FileManager::write_to_file(&output_file, &version.timeline().to_document_text())?;
        info!(
            "Shifted {} captions by {} ms from {}: {:?}",
            moved,
            amount,
            Self::format_timestamp(from_ms),
            output_file
        );
        Ok((output_file, moved))
    }

    /// Create an empty version in `language` carrying the timing of `base_file`
    pub async fn seed(&self, base_file: &Path, language: &str, output_file: Option<PathBuf>) -> Result<PathBuf> {
        let language = language_utils::normalize_to_part1_or_part2t(language)
            .with_context(|| format!("Invalid target language: {}", language))?;

        let base = self.open_version(base_file).await?;
        if language_utils::language_codes_match(&base.language, &language) {
            warn!("Base file is already in {}", language);
        }

        let mut version = SubtitleVersion::new(&language, &self.config.editor);
        let seeded = version.init_empty(Some(base_file)).await?;
        debug!("Seeded {} of {} base captions", seeded, base.timeline().len());

        let output_file = output_file.unwrap_or_else(|| {
            let dir = base_file.parent().unwrap_or(Path::new("."));
            FileManager::generate_output_path(base_file, dir, &language, "dfxp")
        });
        FileManager::write_to_file(&output_file, &version.timeline().to_document_text())?;
        info!("Seeded {} captions in {}: {:?}", seeded, language, output_file);
        Ok(output_file)
    }

    /// Format milliseconds as `H:MM:SS.mmm`, or `unset` for a negative time
    pub fn format_timestamp(ms: Millis) -> String {
        if ms < 0.0 {
            return "unset".to_string();
        }
        let total = ms.round() as u64;
        let millis = total % 1000;
        let seconds = (total / 1000) % 60;
        let minutes = (total / 60_000) % 60;
        let hours = total / 3_600_000;
        format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }
}
