//! Records handed to the coverage report generator.
//!
//! The report generator only needs to know which coach folders exist and
//! which thumbnails each one holds. Layout and rendering live outside this
//! workspace.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One coach folder found under the output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoachRecord {
    /// Folder name, e.g. `12309_3`
    pub name: String,
    /// Thumbnail paths in thumbnail order
    pub images: Vec<PathBuf>,
}

/// Whether the first coach looks like a locomotive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnginePresence {
    Yes,
    Unknown,
}

/// One row of the coach / frame-count table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoachRow {
    pub name: String,
    pub frame_count: usize,
}

/// Header data of the coverage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoverageSummary {
    pub total_coaches: usize,
    pub engine_present: EnginePresence,
    pub rows: Vec<CoachRow>,
}

impl CoverageSummary {
    /// Build the report header from collected coach records.
    ///
    /// The engine guess is a naming heuristic: "yes" when the first folder
    /// name mentions an engine or when exactly two coaches were found.
    pub fn from_records(records: &[CoachRecord]) -> Self {
        let first_is_engine = records
            .first()
            .is_some_and(|r| r.name.to_lowercase().contains("engine"));
        let engine_present = if first_is_engine || records.len() == 2 {
            EnginePresence::Yes
        } else {
            EnginePresence::Unknown
        };

        Self {
            total_coaches: records.len(),
            engine_present,
            rows: records
                .iter()
                .map(|r| CoachRow {
                    name: r.name.clone(),
                    frame_count: r.images.len(),
                })
                .collect(),
        }
    }
}
