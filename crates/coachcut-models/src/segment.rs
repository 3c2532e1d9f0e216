use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Half-open column interval `[start, end)` of a frame assigned to one coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSegment {
    /// First column (inclusive).
    pub start: u32,
    /// One past the last column.
    pub end: u32,
}

impl ColumnSegment {
    /// Create a new segment.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Width in columns.
    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check that the segment is non-empty and lies inside a frame of `frame_width`.
    pub fn is_valid_for(&self, frame_width: u32) -> bool {
        self.start < self.end && self.end <= frame_width
    }
}

/// Check that `segments` partition `[0, frame_width)` without gaps or overlaps.
pub fn is_partition(segments: &[ColumnSegment], frame_width: u32) -> bool {
    if segments.is_empty() {
        return frame_width == 0;
    }

    let mut cursor = 0;
    for segment in segments {
        if segment.start != cursor || !segment.is_valid_for(frame_width) {
            return false;
        }
        cursor = segment.end;
    }

    cursor == frame_width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width() {
        assert_eq!(ColumnSegment::new(10, 40).width(), 30);
        assert_eq!(ColumnSegment::new(40, 10).width(), 0);
    }

    #[test]
    fn test_is_partition() {
        let segments = [ColumnSegment::new(0, 150), ColumnSegment::new(150, 300)];
        assert!(is_partition(&segments, 300));
        assert!(!is_partition(&segments, 310));

        let gap = [ColumnSegment::new(0, 140), ColumnSegment::new(150, 300)];
        assert!(!is_partition(&gap, 300));

        let overlap = [ColumnSegment::new(0, 160), ColumnSegment::new(150, 300)];
        assert!(!is_partition(&overlap, 300));

        let empty = [ColumnSegment::new(0, 0), ColumnSegment::new(0, 300)];
        assert!(!is_partition(&empty, 300));
    }
}
