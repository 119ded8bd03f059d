//! # Error Types
//!
//! This module defines the error types for harmonic reduction.
//!
//! There are two layers of failure:
//! - [`HarmonizeError`] - problems with the input as a whole (bad pitch or key
//!   text, invalid options, malformed YAML, structural score defects, I/O).
//!   These are returned from the public entry points.
//! - [`LabelError`] - a single measure or segment could not be named. These never
//!   abort a pass; they are collected into [`crate::Skipped`] entries and the pass
//!   moves on to the next unit.
//!
//! ## Usage
//! ```rust
//! use harmonize::{chord_symbols, AnalysisOptions, HarmonizeError, Score};
//!
//! let score = Score::new(vec![]);
//! match chord_symbols(&score, &AnalysisOptions::default()) {
//!     Ok(analysis) => {
//!         for skipped in &analysis.skipped {
//!             eprintln!("measure {} skipped: {}", skipped.measure, skipped.reason);
//!         }
//!     }
//!     Err(HarmonizeError::InvalidOptions(message)) => eprintln!("bad options: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarmonizeError {
    /// Pitch text that is not a letter, optional accidentals and an octave.
    ///
    /// # Example
    /// ```
    /// # use harmonize::HarmonizeError;
    /// let err = HarmonizeError::InvalidPitch("H4".to_string());
    /// assert_eq!(err.to_string(), "Invalid pitch 'H4'");
    /// ```
    #[error("Invalid pitch '{0}'")]
    InvalidPitch(String),

    /// Key text that is not a tonic with an optional mode.
    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    /// Analysis options out of range.
    ///
    /// # Example
    /// ```
    /// # use harmonize::HarmonizeError;
    /// let err = HarmonizeError::InvalidOptions("beats-per-segment must be greater than 0".to_string());
    /// assert_eq!(err.to_string(), "Invalid options: beats-per-segment must be greater than 0");
    /// ```
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Structural score defect found by [`crate::validate`].
    ///
    /// # Example
    /// ```
    /// # use harmonize::HarmonizeError;
    /// let err = HarmonizeError::SemanticError {
    ///     measure: 3,
    ///     message: "event at offset 4.5 lies outside the measure (length 4)".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Semantic error at measure 3: event at offset 4.5 lies outside the measure (length 4)"
    /// );
    /// ```
    #[error("Semantic error at measure {measure}: {message}")]
    SemanticError { measure: u32, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a chord could not be turned into a chord symbol or Roman numeral.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelError {
    #[error("chord has no pitches")]
    EmptyChord,

    #[error("root {root} is not a member of the chord")]
    RootNotInChord { root: String },

    #[error("no chord quality matches [{pitches}] above root {root}")]
    UnrecognizedChord { root: String, pitches: String },

    #[error("no chord quality matches [{pitches}] from any root")]
    NoRootFound { pitches: String },

    #[error("chord symbol '{0}' does not resolve to a valid root")]
    InvalidRoot(String),

    #[error("chord symbol '{0}' has an unknown quality or bass")]
    InvalidFigure(String),
}
