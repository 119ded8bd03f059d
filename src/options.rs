//! # Analysis Options
//!
//! Tuning knobs for the reduction passes, loadable from YAML:
//!
//! ```yaml
//! threshold: 0.25            # events at or under this many beats are "short"
//! cumulative-threshold: 1.0  # a run of short events this long is kept
//! beats-per-segment: 2.0     # segment size for the per-segment pass
//! key: D minor               # skip key detection
//! labels: roman-numerals     # chord-symbols | segments | roman-numerals
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::HarmonizeError;
use crate::key::Key;

/// Smallest accepted segment size, a 64th-note grid in quarter-note beats
pub const MIN_BEATS_PER_SEGMENT: f64 = 1.0 / 64.0;

/// Which labeling pass to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelKind {
    /// One chord symbol per measure
    #[default]
    ChordSymbols,
    /// One chord symbol per `beats-per-segment` slice of each measure
    Segments,
    /// One Roman numeral per measure, attached as a lyric
    RomanNumerals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AnalysisOptions {
    /// Events longer than this (in beats) always survive the passing-tone filter
    pub threshold: f64,
    /// Total duration at which a run of short events is kept
    pub cumulative_threshold: f64,
    pub beats_per_segment: f64,
    /// Key for Roman numerals; detected from the score when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    pub labels: LabelKind,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            threshold: 0.25,
            cumulative_threshold: 1.0,
            beats_per_segment: 4.0,
            key: None,
            labels: LabelKind::default(),
        }
    }
}

impl AnalysisOptions {
    /// Parse options from YAML. Empty input gives the defaults.
    pub fn from_yaml(source: &str) -> Result<Self, HarmonizeError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let options: Self =
            serde_yaml::from_str(source).map_err(|e| HarmonizeError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject thresholds that are negative or not finite and segment sizes below
    /// [`MIN_BEATS_PER_SEGMENT`].
    pub fn validate(&self) -> Result<(), HarmonizeError> {
        let non_negative = [
            ("threshold", self.threshold),
            ("cumulative-threshold", self.cumulative_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(HarmonizeError::InvalidOptions(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !self.beats_per_segment.is_finite() || self.beats_per_segment < MIN_BEATS_PER_SEGMENT {
            return Err(HarmonizeError::InvalidOptions(format!(
                "beats-per-segment must be a finite number of at least {}, got {}",
                MIN_BEATS_PER_SEGMENT, self.beats_per_segment
            )));
        }
        Ok(())
    }
}
