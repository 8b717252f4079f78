//! Contact store
//!
//! Holds the immutable roster of known users. The roster is loaded once and
//! never mutated; store order is the tie-break order for equal scores.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::contracts::{ContactRecord, User};
use crate::engine::evaluator;
use crate::error::{ResolutionError, Result};

const SAMPLE_CONTACTS: &str = include_str!("../data/contacts.json");

/// Supported contact file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFormat {
    Json,
    Yaml,
    Toml,
}

impl ContactFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Ok(ContactFormat::Json),
            "yaml" | "yml" => Ok(ContactFormat::Yaml),
            "toml" => Ok(ContactFormat::Toml),
            _ => Err(ResolutionError::InvalidInput(format!(
                "Unsupported contact file format: {}. Supported formats: json, yaml, yml, toml",
                extension
            ))),
        }
    }
}

/// On-disk shape of a contact file
#[derive(Debug, Serialize, Deserialize)]
struct ContactFile {
    #[serde(default)]
    friends: Vec<ContactRecord>,
}

/// Users matching a query, and whether the partial-match fallback was used
#[derive(Debug, Clone)]
pub struct MatchSet<'a> {
    pub used_fallback: bool,
    pub users: Vec<&'a User>,
}

/// Immutable, ordered set of known users
#[derive(Debug, Clone)]
pub struct ContactStore {
    users: Arc<[User]>,
}

impl ContactStore {
    /// Build a store from users, preserving their order
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: users.into(),
        }
    }

    /// The built-in sample roster
    pub fn sample() -> Result<Self> {
        Self::parse(SAMPLE_CONTACTS, ContactFormat::Json)
    }

    /// Load a contact file, choosing the format from its extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ContactFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResolutionError::FileError(format!(
                "Failed to read contact file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let store = Self::parse(&content, format)?;
        tracing::info!(
            path = %path.display(),
            contacts = store.len(),
            "Loaded contact store"
        );
        Ok(store)
    }

    /// Parse contact file content
    ///
    /// Every record is validated; the first malformed one fails the whole
    /// load so the engine never sees a bad phone number.
    pub fn parse(content: &str, format: ContactFormat) -> Result<Self> {
        let file: ContactFile = match format {
            ContactFormat::Json => serde_json::from_str(content)?,
            ContactFormat::Yaml => serde_yaml::from_str(content)?,
            ContactFormat::Toml => toml::from_str(content)?,
        };

        let users = file
            .friends
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                if record.screen_name.trim().is_empty() {
                    return Err(ResolutionError::invalid_contact(format!(
                        "record {}: empty screen name",
                        index
                    )));
                }
                User::try_from(record).map_err(|e| {
                    ResolutionError::invalid_contact(format!("record {}: {}", index, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(users))
    }

    /// All users in store order
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Look up a user by exact screen name
    pub fn find_by_screen_name(&self, screen_name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.screen_name == screen_name)
    }

    /// Users with no conflicting field, in store order
    pub fn find_exact(&self, query: &User) -> Vec<&User> {
        self.users
            .iter()
            .filter(|candidate| evaluator::is_full_match(query, candidate))
            .collect()
    }

    /// Users with at least one matching field, in store order
    pub fn find_partial(&self, query: &User) -> Vec<&User> {
        self.users
            .iter()
            .filter(|candidate| evaluator::is_partial_match(query, candidate))
            .collect()
    }

    /// Exact matches, falling back to partial matches when there are none
    pub fn find_all(&self, query: &User) -> MatchSet<'_> {
        let exact = self.find_exact(query);
        if !exact.is_empty() {
            return MatchSet {
                used_fallback: false,
                users: exact,
            };
        }

        MatchSet {
            used_fallback: true,
            users: self.find_partial(query),
        }
    }
}
