//! Train identifiers and output naming.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Train number used when the caller does not supply one.
pub const DEFAULT_TRAIN_NUMBER: &str = "12309";

/// Extension used for per-coach thumbnails.
pub const THUMBNAIL_EXTENSION: &str = "jpg";

/// Free-form train identifier used in every output folder and file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TrainNumber(pub String);

impl TrainNumber {
    /// Create from an existing string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the folder (and video stem) for a 1-based coach index.
    ///
    /// ```
    /// use coachcut_models::TrainNumber;
    ///
    /// assert_eq!(TrainNumber::new("12309").coach_name(2), "12309_2");
    /// ```
    pub fn coach_name(&self, coach_index: usize) -> String {
        format!("{}_{}", self.0, coach_index)
    }

    /// File name of a coach's video, e.g. `12309_2.mp4`.
    pub fn video_file_name(&self, coach_index: usize, extension: &str) -> String {
        format!("{}.{}", self.coach_name(coach_index), extension)
    }

    /// File name of a coach's `n`-th thumbnail (1-based), e.g. `12309_2_3.jpg`.
    pub fn thumbnail_file_name(&self, coach_index: usize, n: u32) -> String {
        format!("{}_{}.{}", self.coach_name(coach_index), n, THUMBNAIL_EXTENSION)
    }
}

impl Default for TrainNumber {
    fn default() -> Self {
        Self(DEFAULT_TRAIN_NUMBER.to_string())
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TrainNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TrainNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Parse the thumbnail number out of a file name produced by
/// [`TrainNumber::thumbnail_file_name`].
///
/// Returns `None` when the stem has no trailing `_<digits>` part.
pub fn thumbnail_number(file_name: &str) -> Option<u32> {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    let (_, digits) = stem.rsplit_once('_')?;
    digits.parse().ok()
}
