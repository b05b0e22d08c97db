//! Position and range utilities.
//!
//! The analyzer works in line/column coordinates supplied by the external
//! parser. Ranges know how to test point containment with the inclusive
//! and exclusive boundary modes the cursor lookup needs.

use serde::{Deserialize, Serialize};

/// A point in a source document (0-indexed line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column
    pub col: u32,
}

impl Position {
    pub fn new(line: u32, col: u32) -> Self {
        Position { line, col }
    }
}

/// A source range spanning from a start line/column to an end line/column.
///
/// Serialized with the short field names (`sl`, `sc`, `el`, `ec`) the
/// editor front end expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRange {
    #[serde(rename = "sl")]
    pub start_line: u32,
    #[serde(rename = "sc")]
    pub start_col: u32,
    #[serde(rename = "el")]
    pub end_line: u32,
    #[serde(rename = "ec")]
    pub end_col: u32,
}

impl PositionRange {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        PositionRange {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Range covering a run of `len` columns on a single line.
    pub fn on_line(line: u32, start_col: u32, len: u32) -> Self {
        PositionRange::new(line, start_col, line, start_col + len)
    }

    /// The start point of the range.
    pub fn start(&self) -> Position {
        Position::new(self.start_line, self.start_col)
    }

    /// Test whether a point lies within this range.
    ///
    /// Containment is inclusive at both ends for single-line ranges. In
    /// `exclusive` mode the end column is extended by one so a cursor
    /// sitting immediately after the last character still matches; that
    /// is the mode used when mapping a cursor to a node.
    pub fn contains(&self, point: Position, exclusive: bool) -> bool {
        let Position { line, col } = point;
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if self.start_line < line && line < self.end_line {
            return true;
        }
        let end_col = self.end_col + if exclusive { 1 } else { 0 };
        if self.start_line == line && line < self.end_line {
            self.start_col <= col
        } else if self.start_line == line && self.end_line == line {
            self.start_col <= col && col <= end_col
        } else {
            // start_line < line && end_line == line
            col <= end_col
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_containment_is_inclusive() {
        let range = PositionRange::new(2, 4, 2, 8);
        assert!(range.contains(Position::new(2, 4), false));
        assert!(range.contains(Position::new(2, 8), false));
        assert!(!range.contains(Position::new(2, 3), false));
        assert!(!range.contains(Position::new(2, 9), false));
        assert!(!range.contains(Position::new(1, 5), false));
        assert!(!range.contains(Position::new(3, 5), false));
    }

    #[test]
    fn exclusive_mode_extends_end_column_by_one() {
        let range = PositionRange::new(2, 4, 2, 8);
        assert!(range.contains(Position::new(2, 9), true));
        assert!(!range.contains(Position::new(2, 10), true));
    }

    #[test]
    fn multi_line_interior_always_contains() {
        let range = PositionRange::new(1, 10, 4, 2);
        assert!(range.contains(Position::new(2, 0), false));
        assert!(range.contains(Position::new(3, 999), false));
    }

    #[test]
    fn multi_line_edges_check_columns() {
        let range = PositionRange::new(1, 10, 4, 2);
        // Start line: column must be at or past the start column.
        assert!(range.contains(Position::new(1, 10), false));
        assert!(!range.contains(Position::new(1, 9), false));
        // End line: column must be at or before the end column.
        assert!(range.contains(Position::new(4, 2), false));
        assert!(!range.contains(Position::new(4, 3), false));
        assert!(range.contains(Position::new(4, 3), true));
    }

    #[test]
    fn serializes_with_short_field_names() {
        let range = PositionRange::new(0, 1, 2, 3);
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json["sl"], 0);
        assert_eq!(json["sc"], 1);
        assert_eq!(json["el"], 2);
        assert_eq!(json["ec"], 3);
    }
}
