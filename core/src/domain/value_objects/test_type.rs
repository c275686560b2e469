//! Diagnostic test type and the per-realm allow-set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of diagnostic result a verification code attests to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// Laboratory-confirmed positive result
    Confirmed,
    /// Clinically likely diagnosis without lab confirmation
    Likely,
    /// Confirmed negative result
    Negative,
}

impl TestType {
    /// Parse a test type string case-insensitively
    ///
    /// Returns `None` for anything outside the known set.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Some(TestType::Confirmed),
            "likely" => Some(TestType::Likely),
            "negative" => Some(TestType::Negative),
            _ => None,
        }
    }

    /// Canonical lowercase string for this test type
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Confirmed => "confirmed",
            TestType::Likely => "likely",
            TestType::Negative => "negative",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable set of test types a realm (or a verify caller) accepts
///
/// Constructed once and passed by value; there is no mutable global table
/// of valid test types anywhere in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTypeSet {
    confirmed: bool,
    likely: bool,
    negative: bool,
}

impl TestTypeSet {
    /// Empty set
    pub const fn none() -> Self {
        Self {
            confirmed: false,
            likely: false,
            negative: false,
        }
    }

    /// Set containing all known test types
    pub const fn all() -> Self {
        Self {
            confirmed: true,
            likely: true,
            negative: true,
        }
    }

    /// Set containing only `confirmed`
    pub const fn confirmed_only() -> Self {
        Self {
            confirmed: true,
            likely: false,
            negative: false,
        }
    }

    /// Build a set from a slice of test types
    pub fn from_slice(types: &[TestType]) -> Self {
        let mut set = Self::none();
        for t in types {
            set = set.with(*t);
        }
        set
    }

    /// Return a copy of this set with the given type added
    pub fn with(mut self, test_type: TestType) -> Self {
        match test_type {
            TestType::Confirmed => self.confirmed = true,
            TestType::Likely => self.likely = true,
            TestType::Negative => self.negative = true,
        }
        self
    }

    /// Whether the set contains the given test type
    pub fn contains(&self, test_type: TestType) -> bool {
        match test_type {
            TestType::Confirmed => self.confirmed,
            TestType::Likely => self.likely,
            TestType::Negative => self.negative,
        }
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        !(self.confirmed || self.likely || self.negative)
    }

    /// The members of the set in canonical order
    pub fn members(&self) -> Vec<TestType> {
        let mut out = Vec::new();
        if self.confirmed {
            out.push(TestType::Confirmed);
        }
        if self.likely {
            out.push(TestType::Likely);
        }
        if self.negative {
            out.push(TestType::Negative);
        }
        out
    }
}

impl Default for TestTypeSet {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(TestType::parse("confirmed"), Some(TestType::Confirmed));
        assert_eq!(TestType::parse("CONFIRMED"), Some(TestType::Confirmed));
        assert_eq!(TestType::parse("  Likely "), Some(TestType::Likely));
        assert_eq!(TestType::parse("Negative"), Some(TestType::Negative));
        assert_eq!(TestType::parse("positive"), None);
        assert_eq!(TestType::parse(""), None);
    }

    #[test]
    fn test_set_membership() {
        let set = TestTypeSet::from_slice(&[TestType::Confirmed, TestType::Likely]);
        assert!(set.contains(TestType::Confirmed));
        assert!(set.contains(TestType::Likely));
        assert!(!set.contains(TestType::Negative));
    }

    #[test]
    fn test_all_and_none() {
        assert!(TestTypeSet::all().contains(TestType::Negative));
        assert!(TestTypeSet::none().is_empty());
        assert!(!TestTypeSet::all().is_empty());
    }

    #[test]
    fn test_members_order() {
        let set = TestTypeSet::all();
        assert_eq!(
            set.members(),
            vec![TestType::Confirmed, TestType::Likely, TestType::Negative]
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&TestType::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let parsed: TestType = serde_json::from_str("\"likely\"").unwrap();
        assert_eq!(parsed, TestType::Likely);
    }
}
