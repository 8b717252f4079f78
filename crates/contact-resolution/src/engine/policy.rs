//! Resolution policy
//!
//! Maps a ranked candidate list onto a [`ResolutionOutcome`]:
//!
//! | ranked candidates | outcome |
//! |---|---|
//! | none | `Unsupported` |
//! | one, several phone numbers, handle disambiguation on | `Disambiguation` over the numbers |
//! | one, confident | `Success` |
//! | one, not confident | `ConfirmationRequired` |
//! | several | `Disambiguation` over the top `max_candidates` |
//!
//! Authoritative handles and empty requests are answered before ranking, by
//! [`ResolutionEngine`](super::ResolutionEngine).

use serde::{Deserialize, Serialize};

use crate::contracts::resolution::CONFIDENCE_THRESHOLD;
use crate::contracts::{DisambiguationKind, RankedCandidate, ResolutionOutcome, User};
use crate::error::{ResolutionError, Result};

/// Most people offered in a single disambiguation
pub const MAX_DISAMBIGUATION_CANDIDATES: usize = 5;

/// Thresholds and limits applied when choosing an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionPolicy {
    /// Most candidates offered in a person disambiguation
    pub max_candidates: usize,
    /// A unique candidate succeeds outright when its score exceeds this
    pub confidence_threshold: u32,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            max_candidates: MAX_DISAMBIGUATION_CANDIDATES,
            confidence_threshold: CONFIDENCE_THRESHOLD,
        }
    }
}

impl ResolutionPolicy {
    /// Create a policy, rejecting an empty disambiguation limit
    pub fn new(max_candidates: usize, confidence_threshold: u32) -> Result<Self> {
        if max_candidates == 0 {
            return Err(ResolutionError::invalid_input(
                "max_candidates must be at least 1",
            ));
        }
        Ok(Self {
            max_candidates,
            confidence_threshold,
        })
    }

    /// Choose the outcome for a ranked list
    pub fn decide(
        &self,
        query: &User,
        ranked: &[RankedCandidate],
        handle_disambiguation: bool,
    ) -> ResolutionOutcome {
        match ranked {
            [] => ResolutionOutcome::Unsupported,
            [only] => {
                if handle_disambiguation && only.user.phone_numbers.len() > 1 {
                    ResolutionOutcome::Disambiguation {
                        kind: DisambiguationKind::PhoneNumber,
                        options: phone_options(query, &only.user, self.max_candidates),
                    }
                } else if only.is_confident_above(self.confidence_threshold) {
                    ResolutionOutcome::Success(only.user.clone())
                } else {
                    ResolutionOutcome::ConfirmationRequired(only.user.clone())
                }
            }
            several => ResolutionOutcome::Disambiguation {
                kind: DisambiguationKind::Person,
                options: several
                    .iter()
                    .take(self.max_candidates)
                    .map(|candidate| candidate.user.clone())
                    .collect(),
            },
        }
    }
}

/// One option per phone number of `resolved`, at most `limit`
///
/// Each option keeps the query's name components, uses the number as its
/// screen name and carries that single number.
fn phone_options(query: &User, resolved: &User, limit: usize) -> Vec<User> {
    resolved
        .phone_numbers
        .iter()
        .take(limit)
        .map(|phone_number| {
            User::new(phone_number.value.clone())
                .with_name(query.name())
                .with_phone_number(phone_number.clone())
        })
        .collect()
}
