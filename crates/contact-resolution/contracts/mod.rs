//! Contact Resolution Contract Definitions
//!
//! This module defines the data model shared by the contact store, the
//! resolution engine and the intent adapters.
//!
//! # Identity rules
//!
//! - A [`PhoneNumber`] is identified by its value alone; the label is metadata.
//! - A [`User`] is identified by its given and family names only. Two users
//!   with the same name but different screen names or phone numbers compare
//!   equal, which is what the message search relies on when it filters the
//!   history by sender.
//!
//! # Record shape
//!
//! Users are read from and written to contact files and the message log in
//! the record shape described by [`ContactRecord`]:
//!
//! ```json
//! {
//!   "fullName": "Jane Doe",
//!   "screenName": "jdoe",
//!   "isFavorite": true,
//!   "phoneNumbers": [{ "label": "mobile", "phoneNumber": "+1 555 0100" }]
//! }
//! ```

pub mod resolution;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

pub use resolution::{
    DisambiguationKind, RankedCandidate, ResolutionOutcome, ResolutionRequest,
};

fn phone_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9+\-(). ]+$").expect("phone number pattern is valid")
    })
}

/// A labelled phone number attached to a user
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    /// Free-form label such as "mobile" or "work"
    pub label: String,
    /// The dialable number
    #[serde(rename = "phoneNumber")]
    pub value: String,
}

impl PhoneNumber {
    /// Create a new phone number
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Whether the value looks like a dialable number
    ///
    /// Accepts digits, spaces and `+ - ( ) .`, with at least one digit.
    pub fn is_well_formed(&self) -> bool {
        let value = self.value.trim();
        !value.is_empty()
            && phone_number_pattern().is_match(value)
            && value.chars().any(|c| c.is_ascii_digit())
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Hash for PhoneNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.label)
    }
}

/// Given and family name components of a person
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl PersonName {
    /// Create name components from optional parts
    pub fn new(given: Option<&str>, family: Option<&str>) -> Self {
        Self {
            given: given.map(str::to_string),
            family: family.map(str::to_string),
        }
    }

    /// Split a full name into components
    ///
    /// The first whitespace-separated token is the given name and the last
    /// one is the family name; middle tokens are dropped. A single token is
    /// a given name only. Returns `None` when the input has no tokens.
    pub fn parse(full_name: &str) -> Option<Self> {
        let tokens: Vec<&str> = full_name.split_whitespace().collect();
        match tokens.as_slice() {
            [] => None,
            [given] => Some(Self::new(Some(*given), None)),
            [given, .., family] => Some(Self::new(Some(*given), Some(*family))),
        }
    }

    /// Display form: present components joined by a single space
    pub fn formatted(&self) -> String {
        [self.given.as_deref(), self.family.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True when neither component carries any text
    pub fn is_empty(&self) -> bool {
        self.formatted().is_empty()
    }
}

/// A person known to (or looked up in) the contact store
///
/// Serialized through [`ContactRecord`]; see the module docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ContactRecord", into = "ContactRecord")]
pub struct User {
    pub screen_name: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub is_favorite: bool,
    pub phone_numbers: Vec<PhoneNumber>,
}

impl User {
    /// Create a user with only a screen name
    pub fn new(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: screen_name.into(),
            given_name: None,
            family_name: None,
            is_favorite: false,
            phone_numbers: Vec::new(),
        }
    }

    /// Set the given name
    pub fn with_given_name(mut self, given_name: impl Into<String>) -> Self {
        self.given_name = Some(given_name.into());
        self
    }

    /// Set the family name
    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    /// Replace both name components
    pub fn with_name(mut self, name: PersonName) -> Self {
        self.given_name = name.given;
        self.family_name = name.family;
        self
    }

    /// Mark the user as a favorite
    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Append a phone number
    pub fn with_phone_number(mut self, phone_number: PhoneNumber) -> Self {
        self.phone_numbers.push(phone_number);
        self
    }

    /// Name components of this user
    pub fn name(&self) -> PersonName {
        PersonName {
            given: self.given_name.clone(),
            family: self.family_name.clone(),
        }
    }

    /// Display name built from the name components, empty if there are none
    pub fn formatted_name(&self) -> String {
        self.name().formatted()
    }

    fn identity(&self) -> (&str, &str) {
        (
            self.given_name.as_deref().unwrap_or(""),
            self.family_name.as_deref().unwrap_or(""),
        )
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.formatted_name();
        if name.is_empty() {
            write!(f, "@{}", self.screen_name)
        } else {
            write!(f, "{} (@{})", name, self.screen_name)
        }
    }
}

/// Serialized shape of a [`User`]
///
/// Names travel as a single `fullName` that is split again on load, so a
/// user with only a family name comes back with it as the given name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub screen_name: String,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
}

impl TryFrom<ContactRecord> for User {
    type Error = String;

    fn try_from(record: ContactRecord) -> Result<Self, Self::Error> {
        if let Some(bad) = record.phone_numbers.iter().find(|p| !p.is_well_formed()) {
            return Err(format!(
                "malformed phone number '{}' labelled '{}' for '{}'",
                bad.value, bad.label, record.screen_name
            ));
        }

        let name = record
            .full_name
            .as_deref()
            .and_then(PersonName::parse)
            .unwrap_or_default();

        Ok(User {
            screen_name: record.screen_name,
            given_name: name.given,
            family_name: name.family,
            is_favorite: record.is_favorite,
            phone_numbers: record.phone_numbers,
        })
    }
}

impl From<User> for ContactRecord {
    fn from(user: User) -> Self {
        let full_name = user.formatted_name();
        ContactRecord {
            full_name: (!full_name.is_empty()).then_some(full_name),
            screen_name: user.screen_name,
            is_favorite: user.is_favorite,
            phone_numbers: user.phone_numbers,
        }
    }
}

/// Kind of an external person handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    /// A phone number; unique enough to identify a person on its own
    PhoneNumber,
    EmailAddress,
    Unknown,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::PhoneNumber => write!(f, "phone_number"),
            HandleKind::EmailAddress => write!(f, "email_address"),
            HandleKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// An external identifier for a person, as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonHandle {
    pub value: String,
    pub kind: HandleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PersonHandle {
    /// Create a handle
    pub fn new(value: impl Into<String>, kind: HandleKind) -> Self {
        Self {
            value: value.into(),
            kind,
            label: None,
        }
    }

    /// Create a phone number handle carrying the number's label
    pub fn phone(phone_number: &PhoneNumber) -> Self {
        Self {
            value: phone_number.value.clone(),
            kind: HandleKind::PhoneNumber,
            label: Some(phone_number.label.clone()),
        }
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this handle identifies a person without consulting the store
    pub fn is_authoritative(&self) -> bool {
        self.kind == HandleKind::PhoneNumber
    }
}
