//! Search for messages intent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{resolve_people, IntentKind, Person, PersonResolution, ResponseCode, UserActivity};
use crate::engine::ResolutionEngine;
use crate::error::{ResolutionError, Result};
use crate::messages::{Message, MessageLog};

/// A request to list messages from given senders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchForMessagesIntent {
    #[serde(default)]
    pub senders: Option<Vec<Person>>,
}

impl SearchForMessagesIntent {
    pub fn from_senders(senders: Vec<Person>) -> Self {
        Self {
            senders: Some(senders),
        }
    }
}

/// A message in the host's vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMessage {
    pub identifier: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_sent: Option<DateTime<Utc>>,
    pub sender: Person,
    pub recipients: Vec<Person>,
}

impl HostMessage {
    fn from_message(identifier: usize, message: &Message) -> Self {
        Self {
            identifier: identifier.to_string(),
            content: message.content.clone(),
            date_sent: message.date,
            sender: Person::from_user(&message.sender),
            recipients: message.recipients.iter().map(Person::from_user).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchForMessagesResponse {
    pub code: ResponseCode,
    pub user_activity: UserActivity,
    pub messages: Vec<HostMessage>,
}

/// Handles search for messages intents
#[derive(Debug, Clone)]
pub struct SearchForMessagesHandler {
    engine: ResolutionEngine,
    log: Arc<MessageLog>,
}

impl SearchForMessagesHandler {
    pub fn new(engine: ResolutionEngine, log: Arc<MessageLog>) -> Self {
        Self { engine, log }
    }

    /// One resolution per sender
    ///
    /// Senders are resolved as people only; a choice between phone numbers
    /// matters when sending, not when searching.
    pub fn resolve_senders(&self, senders: Option<&[Person]>) -> Vec<PersonResolution> {
        resolve_people(&self.engine, senders, false)
    }

    /// Messages from the first sender
    ///
    /// The sender is looked up among the store's exact matches; finding
    /// none means resolution was skipped and is reported as
    /// [`ResolutionError::MissingIntentData`].
    pub fn handle(&self, intent: &SearchForMessagesIntent) -> Result<SearchForMessagesResponse> {
        let sender = intent
            .senders
            .as_deref()
            .and_then(|senders| senders.first())
            .ok_or_else(|| ResolutionError::missing_intent_data("message sender"))?;

        let query = sender.to_query_user();
        let user = self
            .engine
            .find_users(&query)
            .into_iter()
            .next()
            .cloned()
            .ok_or_else(|| {
                ResolutionError::missing_intent_data(format!(
                    "no contact matches sender {}",
                    sender
                ))
            })?;

        let messages: Vec<HostMessage> = self
            .log
            .messages_from(&user)?
            .iter()
            .enumerate()
            .map(|(index, message)| HostMessage::from_message(index, message))
            .collect();

        tracing::debug!(sender = %user, messages = messages.len(), "Searched message history");

        Ok(SearchForMessagesResponse {
            code: ResponseCode::Success,
            user_activity: UserActivity::for_intent(IntentKind::SearchForMessages),
            messages,
        })
    }
}
