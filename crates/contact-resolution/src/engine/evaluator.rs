//! User match evaluator
//!
//! Runs the field matcher over the comparable fields of a query user and a
//! candidate, always in the order screen name, given name, family name.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::matcher::{Comparison, MatchVerdict};
use crate::contracts::User;

/// A field compared between query and candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    ScreenName,
    GivenName,
    FamilyName,
}

impl MatchField {
    /// All compared fields in evaluation order
    pub const ALL: [MatchField; 3] = [
        MatchField::ScreenName,
        MatchField::GivenName,
        MatchField::FamilyName,
    ];

    /// Comparison used for this field
    ///
    /// Screen names only need to contain the query so that a partial handle
    /// still matches.
    pub fn comparison(self) -> Comparison {
        match self {
            MatchField::ScreenName => Comparison::ContainsCaseInsensitive,
            MatchField::GivenName | MatchField::FamilyName => Comparison::EqualsCaseInsensitive,
        }
    }

    fn value(self, user: &User) -> Option<&str> {
        match self {
            MatchField::ScreenName => Some(user.screen_name.as_str()),
            MatchField::GivenName => user.given_name.as_deref(),
            MatchField::FamilyName => user.family_name.as_deref(),
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchField::ScreenName => write!(f, "screen_name"),
            MatchField::GivenName => write!(f, "given_name"),
            MatchField::FamilyName => write!(f, "family_name"),
        }
    }
}

/// Per-field verdicts for one query/candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    verdicts: [MatchVerdict; 3],
}

impl MatchReport {
    /// Verdicts in [`MatchField::ALL`] order
    pub fn verdicts(&self) -> &[MatchVerdict; 3] {
        &self.verdicts
    }

    /// Verdict for a single field
    pub fn verdict(&self, field: MatchField) -> MatchVerdict {
        self.verdicts[field as usize]
    }

    /// No field conflicts; missing information is tolerated
    pub fn is_full_match(&self) -> bool {
        !self.verdicts.contains(&MatchVerdict::Mismatch)
    }

    /// At least one field matches
    pub fn is_partial_match(&self) -> bool {
        self.verdicts.contains(&MatchVerdict::Match)
    }

    /// Number of matching fields
    pub fn match_count(&self) -> u32 {
        self.verdicts
            .iter()
            .filter(|v| **v == MatchVerdict::Match)
            .count() as u32
    }
}

/// Compare every field of `query` against `candidate`
pub fn evaluate(query: &User, candidate: &User) -> MatchReport {
    let verdicts = MatchField::ALL
        .map(|field| field.comparison().compare(field.value(query), field.value(candidate)));
    MatchReport { verdicts }
}

/// Shorthand for `evaluate(query, candidate).is_full_match()`
pub fn is_full_match(query: &User, candidate: &User) -> bool {
    evaluate(query, candidate).is_full_match()
}

/// Shorthand for `evaluate(query, candidate).is_partial_match()`
pub fn is_partial_match(query: &User, candidate: &User) -> bool {
    evaluate(query, candidate).is_partial_match()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evans() -> User {
        User::new("Evans")
            .with_given_name("Evans")
            .with_family_name("Reily")
    }

    #[test]
    fn test_verdict_order() {
        let query = User::new("ev").with_given_name("Bob");
        let report = evaluate(&query, &evans());
        assert_eq!(
            report.verdicts(),
            &[
                MatchVerdict::Match,
                MatchVerdict::Mismatch,
                MatchVerdict::InsufficientInfo
            ]
        );
        assert_eq!(report.verdict(MatchField::GivenName), MatchVerdict::Mismatch);
    }

    #[test]
    fn test_screen_name_only_query() {
        let report = evaluate(&User::new("Evans"), &evans());
        assert!(report.is_full_match());
        assert!(report.is_partial_match());
        assert_eq!(report.match_count(), 1);
    }

    #[test]
    fn test_empty_query_is_full_but_not_partial() {
        let report = evaluate(&User::new(""), &evans());
        assert!(report.is_full_match());
        assert!(!report.is_partial_match());
        assert_eq!(report.match_count(), 0);
    }

    #[test]
    fn test_full_and_partial_are_independent() {
        // Given name matches, family name conflicts
        let query = User::new("").with_given_name("evans").with_family_name("Smith");
        assert!(!is_full_match(&query, &evans()));
        assert!(is_partial_match(&query, &evans()));
    }

    #[test]
    fn test_all_fields_match() {
        let query = User::new("EVA").with_given_name("evans").with_family_name("reily");
        assert_eq!(evaluate(&query, &evans()).match_count(), 3);
    }
}
