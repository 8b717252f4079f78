//! Messages and the bounded message log
//!
//! The log keeps the most recent messages either in memory or in a JSON
//! file. Sending requires a signed-in user, who becomes the sender.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::contracts::User;
use crate::error::{ResolutionError, Result};

/// Default number of messages kept in the history
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

const SEED_CONTENT: [&str; 3] = ["Hello", "Hi", "How are you?"];

/// A message between users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub sender: User,
    pub recipients: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl Message {
    /// An undated message; the sender is replaced when it is sent
    pub fn new(content: impl Into<String>, sender: User, recipients: Vec<User>) -> Self {
        Self {
            content: content.into(),
            sender,
            recipients,
            date: None,
        }
    }

    /// Draft addressed to `recipients`, sender filled in by [`MessageLog::send`]
    pub fn draft(content: impl Into<String>, recipients: Vec<User>) -> Self {
        Self::new(content, User::new(""), recipients)
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Bounded message history with an optional backing file
#[derive(Debug)]
pub struct MessageLog {
    current_user: Option<User>,
    path: Option<PathBuf>,
    limit: usize,
    history: Mutex<Option<Vec<Message>>>,
}

impl MessageLog {
    /// A log that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            current_user: None,
            path: None,
            limit: DEFAULT_HISTORY_LIMIT,
            history: Mutex::new(None),
        }
    }

    /// A log persisted to `path` as JSON
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::in_memory()
        }
    }

    /// Sign in `user`; `None` leaves the log unauthenticated
    pub fn with_current_user(mut self, user: Option<User>) -> Self {
        self.current_user = user;
        self
    }

    /// Keep at most `limit` messages (at least one)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn history_limit(&self) -> usize {
        self.limit
    }

    /// The message history, oldest first
    ///
    /// A missing or unreadable history file yields the seed conversation.
    pub fn load_history(&self) -> Result<Vec<Message>> {
        let mut guard = self.lock()?;
        Ok(self.loaded(&mut guard).clone())
    }

    /// Messages whose sender is `sender`, compared by name
    pub fn messages_from(&self, sender: &User) -> Result<Vec<Message>> {
        let mut guard = self.lock()?;
        Ok(self
            .loaded(&mut guard)
            .iter()
            .filter(|message| &message.sender == sender)
            .cloned()
            .collect())
    }

    /// Send a message as the current user
    ///
    /// The stored copy carries the current user as sender and the current
    /// time as date; that copy is returned.
    pub fn send(&self, message: Message) -> Result<Message> {
        let sender = self
            .current_user
            .clone()
            .ok_or(ResolutionError::NotAuthenticated)?;

        let dated = Message {
            content: message.content,
            sender,
            recipients: message.recipients,
            date: Some(Utc::now()),
        };

        let mut guard = self.lock()?;
        let history = self.loaded(&mut guard);

        // History is replaced only once the new state is persisted
        let mut next = history.clone();
        next.push(dated.clone());
        if next.len() > self.limit {
            let excess = next.len() - self.limit;
            next.drain(..excess);
        }

        if let Some(path) = &self.path {
            save(path, &next)?;
        }
        *history = next;

        tracing::info!(
            recipients = dated.recipients.len(),
            history = history.len(),
            "Sent message"
        );
        Ok(dated)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Vec<Message>>>> {
        self.history
            .lock()
            .map_err(|_| ResolutionError::InternalError("message history lock poisoned".into()))
    }

    fn loaded<'g>(
        &self,
        guard: &'g mut MutexGuard<'_, Option<Vec<Message>>>,
    ) -> &'g mut Vec<Message> {
        guard.get_or_insert_with(|| {
            self.path
                .as_deref()
                .and_then(read_history)
                .unwrap_or_else(|| self.seed_history())
        })
    }

    fn seed_history(&self) -> Vec<Message> {
        let Some(local_user) = &self.current_user else {
            return Vec::new();
        };

        let friend = User::new("John Doe")
            .with_given_name("John")
            .with_family_name("Doe");
        let now = Utc::now();

        SEED_CONTENT
            .iter()
            .map(|content| {
                Message::new(*content, friend.clone(), vec![local_user.clone()]).with_date(now)
            })
            .collect()
    }
}

fn read_history(path: &Path) -> Option<Vec<Message>> {
    let content = std::fs::read_to_string(path).ok()?;
    let entries: Vec<serde_json::Value> = match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable message history");
            return None;
        }
    };

    let total = entries.len();
    let messages: Vec<Message> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();

    if messages.len() < total {
        tracing::warn!(
            path = %path.display(),
            skipped = total - messages.len(),
            "Skipped malformed history entries"
        );
    }
    Some(messages)
}

fn save(path: &Path, messages: &[Message]) -> Result<()> {
    let json = serde_json::to_string_pretty(messages)
        .map_err(|e| ResolutionError::SerializationError(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| {
        ResolutionError::file_error(format!(
            "Failed to write message history '{}': {}",
            path.display(),
            e
        ))
    })?;
    tracing::debug!(path = %path.display(), messages = messages.len(), "Persisted message history");
    Ok(())
}
