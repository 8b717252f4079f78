//! Resolution request and outcome contracts
//!
//! A [`ResolutionRequest`] carries the query user and the call-site options;
//! the engine answers with exactly one [`ResolutionOutcome`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{PersonHandle, User};

/// Scores strictly above this value count as confident
pub const CONFIDENCE_THRESHOLD: u32 = 1;

/// A single person lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionRequest {
    /// The possibly incomplete person to look up
    pub query: User,

    /// External identifier supplied alongside the query, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<PersonHandle>,

    /// Whether a uniquely resolved user with several phone numbers should
    /// be disambiguated down to a single number
    #[serde(default = "default_handle_disambiguation")]
    pub handle_disambiguation: bool,
}

fn default_handle_disambiguation() -> bool {
    true
}

impl ResolutionRequest {
    /// Create a request with handle disambiguation enabled
    pub fn new(query: User) -> Self {
        Self {
            query,
            handle: None,
            handle_disambiguation: true,
        }
    }

    /// Attach an external handle
    pub fn with_handle(mut self, handle: PersonHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Enable or disable handle disambiguation
    pub fn handle_disambiguation(mut self, enabled: bool) -> Self {
        self.handle_disambiguation = enabled;
        self
    }

    /// The authoritative handle, if the request carries one
    pub fn authoritative_handle(&self) -> Option<&PersonHandle> {
        self.handle.as_ref().filter(|h| h.is_authoritative())
    }
}

/// A store user scored against a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub user: User,
    /// Favorite bonus plus one point per matching field, in `0..=4`
    pub score: u32,
    /// Set on every candidate of a batch obtained through the partial-match
    /// fallback
    pub is_partial_match_set: bool,
}

impl RankedCandidate {
    /// Create a ranked candidate
    pub fn new(user: User, score: u32, is_partial_match_set: bool) -> Self {
        Self {
            user,
            score,
            is_partial_match_set,
        }
    }

    /// Confident with the default threshold
    pub fn is_confident(&self) -> bool {
        self.is_confident_above(CONFIDENCE_THRESHOLD)
    }

    /// Confident when the score exceeds `threshold` and the batch was an
    /// exact match set
    pub fn is_confident_above(&self, threshold: u32) -> bool {
        !self.is_partial_match_set && self.score > threshold
    }
}

/// What a disambiguation asks the user to choose between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisambiguationKind {
    /// Several different people matched
    Person,
    /// One person matched; choose which of their phone numbers to use.
    /// Each option carries exactly one phone number.
    PhoneNumber,
}

/// Final answer for one resolution request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// The caller supplied nothing to resolve
    NeedsValue,
    Success(User),
    ConfirmationRequired(User),
    Disambiguation {
        kind: DisambiguationKind,
        options: Vec<User>,
    },
    /// Nobody in the store matches
    Unsupported,
}

impl ResolutionOutcome {
    /// Stable snake_case label, used for metrics and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionOutcome::NeedsValue => "needs_value",
            ResolutionOutcome::Success(_) => "success",
            ResolutionOutcome::ConfirmationRequired(_) => "confirmation_required",
            ResolutionOutcome::Disambiguation { .. } => "disambiguation",
            ResolutionOutcome::Unsupported => "unsupported",
        }
    }

    /// Users carried by the outcome, in presentation order
    pub fn users(&self) -> &[User] {
        match self {
            ResolutionOutcome::Success(user) | ResolutionOutcome::ConfirmationRequired(user) => {
                std::slice::from_ref(user)
            }
            ResolutionOutcome::Disambiguation { options, .. } => options,
            ResolutionOutcome::NeedsValue | ResolutionOutcome::Unsupported => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionOutcome::Success(_))
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionOutcome::Success(user) => write!(f, "success: {}", user),
            ResolutionOutcome::ConfirmationRequired(user) => {
                write!(f, "confirmation required: {}", user)
            }
            ResolutionOutcome::Disambiguation { kind, options } => {
                let kind = match kind {
                    DisambiguationKind::Person => "people",
                    DisambiguationKind::PhoneNumber => "phone numbers",
                };
                write!(f, "disambiguation between {} {}", options.len(), kind)
            }
            other => write!(f, "{}", other.label().replace('_', " ")),
        }
    }
}
