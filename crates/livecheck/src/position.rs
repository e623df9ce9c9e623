//! Cursor positions as the text widget reports them.

use std::fmt;

/// A cursor position at the UI boundary.
///
/// Both `line` and `column` are 1-based. The checker expects a 0-based column; use
/// [`CursorPosition::service_column`] at the call site that talks to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorPosition {
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based, in characters).
    pub column: u32,
}

impl CursorPosition {
    /// Create a new position (1-based line and column).
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The column as the checker counts it (0-based).
    pub fn service_column(&self) -> u32 {
        self.column.saturating_sub(1)
    }

    /// Build a position from 0-based buffer coordinates, saturating at `u32::MAX`.
    pub fn from_zero_based(line: usize, column: usize) -> Self {
        let one_based = |n: usize| u32::try_from(n).unwrap_or(u32::MAX).saturating_add(1);
        Self {
            line: one_based(line),
            column: one_based(column),
        }
    }
}

impl fmt::Display for CursorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_column_is_zero_based() {
        let pos = CursorPosition::new(4, 8);
        assert_eq!(pos.service_column(), 7);
        assert_eq!(CursorPosition::new(1, 1).service_column(), 0);
    }

    #[test]
    fn test_from_zero_based() {
        assert_eq!(CursorPosition::from_zero_based(0, 0), CursorPosition::new(1, 1));
        assert_eq!(CursorPosition::from_zero_based(3, 7), CursorPosition::new(4, 8));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_from_zero_based_saturates() {
        let huge = u32::MAX as usize + 5;
        assert_eq!(
            CursorPosition::from_zero_based(huge, u32::MAX as usize),
            CursorPosition::new(u32::MAX, u32::MAX)
        );
    }
}
