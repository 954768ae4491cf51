//! Severity categories for findings

use serde::{Deserialize, Serialize};

/// Severity tier assigned to every finding
///
/// Ordered so that `Danger > Warning > Good`, which lets callers sort and
/// compare report contents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    /// Good practice observed, no action needed
    #[default]
    Good,
    /// Risk worth reviewing, not immediately exploitable
    Warning,
    /// Serious misconfiguration or fault, immediate attention required
    Danger,
}

impl Category {
    /// Get display string (matches the wire format used in stored reports)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Warning => "Warning",
            Category::Danger => "Danger",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ordering() {
        assert!(Category::Danger > Category::Warning);
        assert!(Category::Warning > Category::Good);
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Category::Danger).unwrap();
        assert_eq!(json, "\"Danger\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::Danger);
    }
}
