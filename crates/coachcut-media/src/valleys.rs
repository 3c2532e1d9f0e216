//! Valley detection over aggregated column profiles.
//!
//! # Algorithm
//! 1. Average all per-frame profiles column by column
//! 2. Min-max normalise the average to [0, 1]
//! 3. Mark columns strictly below the threshold ratio as "low"
//! 4. Group low columns left to right; a column joins the running cluster
//!    when it is at most `min_distance / 2` columns past the cluster's last member
//! 5. Collapse every cluster to the truncated mean of its members
//!
//! Everything here is pure: identical profiles always give identical centers.

use tracing::{debug, warn};

use coachcut_models::SplitConfig;

use crate::error::{MediaError, MediaResult};

/// Guard added to the normalisation denominator.
pub const NORMALIZATION_EPSILON: f64 = 1e-9;

/// Boundary centers found in a set of profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValleyDetection {
    /// Strictly increasing column coordinates
    pub centers: Vec<u32>,
    /// The averaged profile had no dynamic range
    pub degenerate: bool,
}

/// Aggregates column profiles and locates low-density valleys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileAggregator {
    threshold_ratio: f64,
    min_distance: u32,
}

impl ProfileAggregator {
    /// Create an aggregator with an explicit threshold and clustering distance.
    pub fn new(threshold_ratio: f64, min_distance: u32) -> Self {
        Self {
            threshold_ratio,
            min_distance,
        }
    }

    /// Create an aggregator tuned for a frame of `frame_width` columns.
    pub fn from_config(config: &SplitConfig, frame_width: u32) -> Self {
        Self::new(config.valley_threshold, config.min_distance(frame_width))
    }

    /// Maximum distance between consecutive members of one cluster.
    pub fn max_gap(&self) -> usize {
        (self.min_distance / 2) as usize
    }

    /// Find boundary centers in `profiles`.
    ///
    /// # Errors
    /// `EmptyProfileSet` when `profiles` is empty, `ProfileLengthMismatch` when
    /// the profiles do not all share one length.
    pub fn detect<P: AsRef<[f32]>>(&self, profiles: &[P]) -> MediaResult<ValleyDetection> {
        let mean = mean_profile(profiles)?;
        let Some(normalized) = normalize(&mean) else {
            warn!(
                columns = mean.len(),
                profiles = profiles.len(),
                "Aggregate profile has no dynamic range; treating frame as a single segment"
            );
            return Ok(ValleyDetection {
                centers: Vec::new(),
                degenerate: true,
            });
        };

        let low = low_columns(&normalized, self.threshold_ratio);
        let centers = cluster_centers(&low, self.max_gap());

        debug!(
            low_columns = low.len(),
            clusters = centers.len(),
            threshold = self.threshold_ratio,
            max_gap = self.max_gap(),
            "Valley search complete"
        );

        Ok(ValleyDetection {
            centers,
            degenerate: false,
        })
    }
}

/// Element-wise mean of equally long profiles.
pub fn mean_profile<P: AsRef<[f32]>>(profiles: &[P]) -> MediaResult<Vec<f64>> {
    let first = profiles.first().ok_or(MediaError::EmptyProfileSet)?;
    let width = first.as_ref().len();

    let mut sum = vec![0.0f64; width];
    for profile in profiles {
        let profile = profile.as_ref();
        if profile.len() != width {
            return Err(MediaError::ProfileLengthMismatch {
                expected: width,
                found: profile.len(),
            });
        }
        for (acc, v) in sum.iter_mut().zip(profile) {
            *acc += *v as f64;
        }
    }

    let count = profiles.len() as f64;
    Ok(sum.into_iter().map(|v| v / count).collect())
}

/// Min-max normalise to [0, 1].
///
/// Returns `None` for an empty or constant profile.
pub fn normalize(profile: &[f64]) -> Option<Vec<f64>> {
    let min = profile.iter().copied().fold(f64::INFINITY, f64::min);
    let max = profile.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if profile.is_empty() || !(max - min).is_finite() || max - min < NORMALIZATION_EPSILON {
        return None;
    }

    let denom = max - min + NORMALIZATION_EPSILON;
    Some(profile.iter().map(|v| (v - min) / denom).collect())
}

/// Indices of columns strictly below `threshold`.
pub fn low_columns(normalized: &[f64], threshold: f64) -> Vec<usize> {
    normalized
        .iter()
        .enumerate()
        .filter(|(_, v)| **v < threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Group sorted column indices and return each group's truncated mean.
pub fn cluster_centers(columns: &[usize], max_gap: usize) -> Vec<u32> {
    let mut centers = Vec::new();
    let Some((&first, rest)) = columns.split_first() else {
        return centers;
    };

    let mut sum = first as u64;
    let mut count = 1u64;
    let mut last = first;
    for &x in rest {
        if x - last <= max_gap {
            sum += x as u64;
            count += 1;
        } else {
            centers.push((sum / count) as u32);
            sum = x as u64;
            count = 1;
        }
        last = x;
    }
    centers.push((sum / count) as u32);

    centers
}
