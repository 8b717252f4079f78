//! Field matcher
//!
//! Compares one optional field of a query against the same field of a
//! candidate. Missing or empty input never counts as a match or a mismatch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of comparing one field pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchVerdict {
    /// One side is absent or empty
    InsufficientInfo,
    Match,
    Mismatch,
}

impl fmt::Display for MatchVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchVerdict::InsufficientInfo => write!(f, "insufficient_info"),
            MatchVerdict::Match => write!(f, "match"),
            MatchVerdict::Mismatch => write!(f, "mismatch"),
        }
    }
}

/// Comparison strategy applied to a lowercased field pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// The candidate value contains the query value
    ContainsCaseInsensitive,
    /// Both values are equal
    EqualsCaseInsensitive,
}

impl Comparison {
    /// Compare a query value with a candidate value
    pub fn compare(self, query: Option<&str>, candidate: Option<&str>) -> MatchVerdict {
        let (Some(query), Some(candidate)) = (lowercased(query), lowercased(candidate)) else {
            return MatchVerdict::InsufficientInfo;
        };

        let matched = match self {
            Comparison::ContainsCaseInsensitive => candidate.contains(query.as_str()),
            Comparison::EqualsCaseInsensitive => candidate == query,
        };

        if matched {
            MatchVerdict::Match
        } else {
            MatchVerdict::Mismatch
        }
    }
}

fn lowercased(value: Option<&str>) -> Option<String> {
    value.map(str::to_lowercase).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_are_insufficient() {
        for comparison in [
            Comparison::ContainsCaseInsensitive,
            Comparison::EqualsCaseInsensitive,
        ] {
            assert_eq!(comparison.compare(None, Some("x")), MatchVerdict::InsufficientInfo);
            assert_eq!(comparison.compare(Some("x"), None), MatchVerdict::InsufficientInfo);
            assert_eq!(comparison.compare(Some(""), Some("x")), MatchVerdict::InsufficientInfo);
            assert_eq!(comparison.compare(Some("x"), Some("")), MatchVerdict::InsufficientInfo);
        }
    }

    #[test]
    fn test_equality_ignores_case() {
        let eq = Comparison::EqualsCaseInsensitive;
        assert_eq!(eq.compare(Some("Jane"), Some("JANE")), MatchVerdict::Match);
        assert_eq!(eq.compare(Some("Jane"), Some("Janet")), MatchVerdict::Mismatch);
    }

    #[test]
    fn test_containment_direction() {
        let contains = Comparison::ContainsCaseInsensitive;
        assert_eq!(contains.compare(Some("ev"), Some("Evans")), MatchVerdict::Match);
        assert_eq!(contains.compare(Some("Evans"), Some("ev")), MatchVerdict::Mismatch);
        assert_eq!(contains.compare(Some("EVANS"), Some("evans")), MatchVerdict::Match);
    }

    #[test]
    fn test_whitespace_is_not_empty() {
        let eq = Comparison::EqualsCaseInsensitive;
        assert_eq!(eq.compare(Some(" "), Some("a")), MatchVerdict::Mismatch);
    }
}
