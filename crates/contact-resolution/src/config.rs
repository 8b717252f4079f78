//! Resolver configuration
//!
//! Settings come from defaults, the builder, or `CONTACT_RESOLVER_*`
//! environment variables. Unparseable values fall back to the defaults.

use std::path::PathBuf;
use std::sync::Arc;

use crate::contracts::resolution::CONFIDENCE_THRESHOLD;
use crate::engine::{ResolutionEngine, ResolutionPolicy, MAX_DISAMBIGUATION_CANDIDATES};
use crate::error::{ResolutionError, Result};
use crate::messages::{MessageLog, DEFAULT_HISTORY_LIMIT};
use crate::store::ContactStore;
use crate::telemetry::ResolutionMetrics;

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Contact file; the built-in sample roster when absent
    pub contacts_path: Option<PathBuf>,

    /// Message history file; history stays in memory when absent
    pub history_path: Option<PathBuf>,

    /// Most people offered in a single disambiguation
    pub max_disambiguation_candidates: usize,

    /// Scores above this are confident
    pub confidence_threshold: u32,

    /// Most messages kept in the history
    pub history_limit: usize,

    /// Screen name of the signed-in user; nobody is signed in when absent
    pub current_user: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            contacts_path: None,
            history_path: None,
            max_disambiguation_candidates: MAX_DISAMBIGUATION_CANDIDATES,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            history_limit: DEFAULT_HISTORY_LIMIT,
            current_user: None,
        }
    }
}

impl ResolverConfig {
    /// Create a new config builder
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            contacts_path: std::env::var("CONTACT_RESOLVER_CONTACTS")
                .ok()
                .map(PathBuf::from),
            history_path: std::env::var("CONTACT_RESOLVER_HISTORY")
                .ok()
                .map(PathBuf::from),
            max_disambiguation_candidates: std::env::var("CONTACT_RESOLVER_MAX_CANDIDATES")
                .map(|v| v.parse().unwrap_or(defaults.max_disambiguation_candidates))
                .unwrap_or(defaults.max_disambiguation_candidates),
            confidence_threshold: std::env::var("CONTACT_RESOLVER_CONFIDENCE_THRESHOLD")
                .map(|v| v.parse().unwrap_or(defaults.confidence_threshold))
                .unwrap_or(defaults.confidence_threshold),
            history_limit: std::env::var("CONTACT_RESOLVER_HISTORY_LIMIT")
                .map(|v| v.parse().unwrap_or(defaults.history_limit))
                .unwrap_or(defaults.history_limit),
            current_user: std::env::var("CONTACT_RESOLVER_CURRENT_USER").ok(),
        }
    }

    /// Check limits that would make resolution or history meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_disambiguation_candidates == 0 {
            return Err(ResolutionError::invalid_input(
                "max_disambiguation_candidates must be at least 1",
            ));
        }
        if self.history_limit == 0 {
            return Err(ResolutionError::invalid_input(
                "history_limit must be at least 1",
            ));
        }
        Ok(())
    }

    /// Resolution policy described by this config
    pub fn policy(&self) -> Result<ResolutionPolicy> {
        ResolutionPolicy::new(self.max_disambiguation_candidates, self.confidence_threshold)
    }

    /// Load the configured contact store
    pub fn load_store(&self) -> Result<ContactStore> {
        match &self.contacts_path {
            Some(path) => ContactStore::from_path(path),
            None => ContactStore::sample(),
        }
    }

    /// Build an engine over the configured store
    pub fn build_engine(
        &self,
        metrics: Option<Arc<ResolutionMetrics>>,
    ) -> Result<ResolutionEngine> {
        self.validate()?;
        let engine = ResolutionEngine::new(self.load_store()?).with_policy(self.policy()?);
        Ok(match metrics {
            Some(metrics) => engine.with_metrics(metrics),
            None => engine,
        })
    }

    /// Build the message log, signing in the configured user
    ///
    /// The current user must exist in `store`.
    pub fn build_message_log(&self, store: &ContactStore) -> Result<MessageLog> {
        self.validate()?;
        let current_user = match &self.current_user {
            Some(screen_name) => Some(
                store
                    .find_by_screen_name(screen_name)
                    .cloned()
                    .ok_or_else(|| {
                        ResolutionError::invalid_input(format!(
                            "current user '{}' is not in the contact store",
                            screen_name
                        ))
                    })?,
            ),
            None => None,
        };

        let log = match &self.history_path {
            Some(path) => MessageLog::with_file(path.clone()),
            None => MessageLog::in_memory(),
        };
        Ok(log
            .with_current_user(current_user)
            .with_history_limit(self.history_limit))
    }
}

/// Builder for ResolverConfig
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Set the contact file
    pub fn contacts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.contacts_path = Some(path.into());
        self
    }

    /// Set the history file
    pub fn history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.history_path = Some(path.into());
        self
    }

    /// Set the disambiguation limit
    pub fn max_disambiguation_candidates(mut self, max: usize) -> Self {
        self.config.max_disambiguation_candidates = max;
        self
    }

    /// Set the confidence threshold
    pub fn confidence_threshold(mut self, threshold: u32) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    /// Set the history limit
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Sign in a user by screen name
    pub fn current_user(mut self, screen_name: impl Into<String>) -> Self {
        self.config.current_user = Some(screen_name.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

impl Default for ResolverConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_disambiguation_candidates, 5);
        assert_eq!(config.confidence_threshold, 1);
        assert_eq!(config.history_limit, 50);
        assert!(config.current_user.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ResolverConfig::builder()
            .contacts_path("contacts.yaml")
            .max_disambiguation_candidates(3)
            .confidence_threshold(2)
            .current_user("Evans")
            .build();
        assert_eq!(config.contacts_path, Some(PathBuf::from("contacts.yaml")));
        assert_eq!(config.policy().unwrap().max_candidates, 3);
        assert_eq!(config.policy().unwrap().confidence_threshold, 2);
        assert_eq!(config.current_user.as_deref(), Some("Evans"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = ResolverConfig::builder().max_disambiguation_candidates(0).build();
        assert!(config.validate().is_err());
        let config = ResolverConfig::builder().history_limit(0).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_engine_uses_sample_roster() {
        let engine = ResolverConfig::default().build_engine(None).unwrap();
        assert!(!engine.store().is_empty());
    }

    #[test]
    fn test_unknown_current_user_is_rejected() {
        let store = ContactStore::sample().unwrap();
        let config = ResolverConfig::builder().current_user("nobody-here").build();
        assert!(config.build_message_log(&store).is_err());

        let config = ResolverConfig::builder().current_user("Evans").build();
        assert!(config.build_message_log(&store).unwrap().is_authenticated());
    }
}
