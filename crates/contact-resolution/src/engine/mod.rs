//! Contact resolution engine
//!
//! Components, leaves first:
//!
//! - [`matcher`]: compares one field pair into a [`MatchVerdict`]
//! - [`evaluator`]: runs the matcher over screen name, given name and
//!   family name
//! - [`ranking`]: scores and orders the store's match set
//! - [`policy`]: turns the ranked list into a [`ResolutionOutcome`]
//!
//! [`ResolutionEngine`] ties them to a [`ContactStore`]. It is read-only and
//! holds no mutable state, so one engine can serve many threads.

pub mod evaluator;
pub mod matcher;
pub mod policy;
pub mod ranking;

pub use evaluator::{evaluate, MatchField, MatchReport};
pub use matcher::{Comparison, MatchVerdict};
pub use policy::{ResolutionPolicy, MAX_DISAMBIGUATION_CANDIDATES};
pub use ranking::FAVORITE_BONUS;

use std::sync::Arc;

use crate::contracts::{PhoneNumber, RankedCandidate, ResolutionOutcome, ResolutionRequest, User};
use crate::store::ContactStore;
use crate::telemetry::ResolutionMetrics;

/// Resolves query users against a contact store
#[derive(Clone)]
pub struct ResolutionEngine {
    store: ContactStore,
    policy: ResolutionPolicy,
    metrics: Option<Arc<ResolutionMetrics>>,
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("contacts", &self.store.len())
            .field("policy", &self.policy)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl ResolutionEngine {
    /// Create an engine with the default policy
    pub fn new(store: ContactStore) -> Self {
        Self {
            store,
            policy: ResolutionPolicy::default(),
            metrics: None,
        }
    }

    /// Replace the resolution policy
    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Record resolutions into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<ResolutionMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The underlying contact store
    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    /// The active policy
    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    /// Users matching every known field of `query`, in store order
    pub fn find_users(&self, query: &User) -> Vec<&User> {
        self.store.find_exact(query)
    }

    /// Score-ordered candidates for `query`, without applying the policy
    pub fn rank_users(&self, query: &User) -> Vec<RankedCandidate> {
        let ranked = ranking::rank(&self.store, query);
        if let Some(metrics) = &self.metrics {
            let used_fallback = ranked.first().map_or(true, |c| c.is_partial_match_set);
            metrics.record_match_set(used_fallback, ranked.len());
        }
        ranked
    }

    /// Resolve a query user
    pub fn resolve_person(&self, query: &User, handle_disambiguation: bool) -> ResolutionOutcome {
        self.resolve(
            &ResolutionRequest::new(query.clone()).handle_disambiguation(handle_disambiguation),
        )
    }

    /// Resolve a single request
    ///
    /// An authoritative handle (a phone number) succeeds immediately with the
    /// query user carrying that number; the store is not consulted.
    pub fn resolve(&self, request: &ResolutionRequest) -> ResolutionOutcome {
        let _timer = self.metrics.as_ref().map(|m| m.start_timer());

        let outcome = match request.authoritative_handle() {
            Some(handle) => {
                let mut user = request.query.clone();
                if user.screen_name.is_empty() {
                    user.screen_name = handle.value.clone();
                }
                if !user.phone_numbers.iter().any(|p| p.value == handle.value) {
                    user.phone_numbers.push(PhoneNumber::new(
                        handle.label.clone().unwrap_or_default(),
                        handle.value.clone(),
                    ));
                }
                ResolutionOutcome::Success(user)
            }
            None => {
                let ranked = self.rank_users(&request.query);
                self.policy
                    .decide(&request.query, &ranked, request.handle_disambiguation)
            }
        };

        tracing::debug!(
            query = %request.query,
            outcome = outcome.label(),
            options = outcome.users().len(),
            "Resolved person"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(outcome.label());
        }

        outcome
    }

    /// Resolve every request of a caller
    ///
    /// A caller that supplies no requests gets a single `NeedsValue`.
    pub fn resolve_all(&self, requests: &[ResolutionRequest]) -> Vec<ResolutionOutcome> {
        if requests.is_empty() {
            if let Some(metrics) = &self.metrics {
                metrics.record_outcome(ResolutionOutcome::NeedsValue.label());
            }
            return vec![ResolutionOutcome::NeedsValue];
        }

        requests.iter().map(|request| self.resolve(request)).collect()
    }
}
