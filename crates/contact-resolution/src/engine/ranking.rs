//! Ranking engine
//!
//! Scores the match set for a query and orders it by descending score.

use super::evaluator;
use crate::contracts::{RankedCandidate, User};
use crate::store::ContactStore;

/// Bonus point awarded to favorite contacts
pub const FAVORITE_BONUS: u32 = 1;

/// Favorite bonus plus one point per matching field
pub fn score(query: &User, candidate: &User) -> u32 {
    let favorite = if candidate.is_favorite { FAVORITE_BONUS } else { 0 };
    favorite + evaluator::evaluate(query, candidate).match_count()
}

/// Rank the store's match set for `query`
///
/// The sort is stable: equal scores keep store order, which keeps the
/// disambiguation prefix deterministic for a given store.
pub fn rank(store: &ContactStore, query: &User) -> Vec<RankedCandidate> {
    let match_set = store.find_all(query);
    let used_fallback = match_set.used_fallback;

    let mut ranked: Vec<RankedCandidate> = match_set
        .users
        .into_iter()
        .map(|user| RankedCandidate::new(user.clone(), score(query, user), used_fallback))
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    tracing::debug!(
        candidates = ranked.len(),
        used_fallback,
        top_score = ranked.first().map(|c| c.score),
        "Ranked contact candidates"
    );

    ranked
}
