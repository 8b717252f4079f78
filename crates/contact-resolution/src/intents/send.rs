//! Send message intent

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    resolve_people, ActivityKind, Person, PersonResolution, ResponseCode, UserActivity,
    ValueResolution,
};
use crate::engine::ResolutionEngine;
use crate::error::{ResolutionError, Result};
use crate::messages::{Message, MessageLog};

/// A request to send a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageIntent {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub recipients: Option<Vec<Person>>,
}

impl SendMessageIntent {
    pub fn new(content: impl Into<String>, recipients: Vec<Person>) -> Self {
        Self {
            content: Some(content.into()),
            recipients: Some(recipients),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub code: ResponseCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_activity: Option<UserActivity>,
}

impl SendMessageResponse {
    fn new(code: ResponseCode, user_activity: Option<UserActivity>) -> Self {
        Self {
            code,
            user_activity,
        }
    }
}

/// Handles send message intents
#[derive(Debug, Clone)]
pub struct SendMessageHandler {
    engine: ResolutionEngine,
    log: Arc<MessageLog>,
}

impl SendMessageHandler {
    pub fn new(engine: ResolutionEngine, log: Arc<MessageLog>) -> Self {
        Self { engine, log }
    }

    /// Empty content counts as missing
    pub fn resolve_content(&self, content: Option<&str>) -> ValueResolution<String> {
        match content {
            Some(text) if !text.is_empty() => ValueResolution::Success(text.to_string()),
            _ => ValueResolution::NeedsValue,
        }
    }

    /// One resolution per recipient, offering a choice of phone numbers
    pub fn resolve_recipients(&self, recipients: Option<&[Person]>) -> Vec<PersonResolution> {
        resolve_people(&self.engine, recipients, true)
    }

    /// Ready when a user is signed in, otherwise the app must open to log in
    pub fn confirm(&self, _intent: &SendMessageIntent) -> SendMessageResponse {
        if self.log.is_authenticated() {
            SendMessageResponse::new(ResponseCode::Ready, None)
        } else {
            SendMessageResponse::new(
                ResponseCode::FailureRequiringAppLaunch,
                Some(UserActivity::messaging(ActivityKind::LoginRequired, None)),
            )
        }
    }

    /// Send the message
    ///
    /// Content and recipients must have been resolved first; their absence
    /// is reported as [`ResolutionError::MissingIntentData`]. A failed send
    /// is a `Failure` response, not an error.
    pub fn handle(&self, intent: &SendMessageIntent) -> Result<SendMessageResponse> {
        let content = intent
            .content
            .as_deref()
            .ok_or_else(|| ResolutionError::missing_intent_data("message content"))?;
        let recipients = intent
            .recipients
            .as_ref()
            .ok_or_else(|| ResolutionError::missing_intent_data("message recipients"))?;

        let users = recipients.iter().map(Person::to_query_user).collect();
        let response = match self.log.send(Message::draft(content, users)) {
            Ok(sent) => SendMessageResponse::new(
                ResponseCode::Success,
                Some(UserActivity::messaging(
                    ActivityKind::SentMessage,
                    Some(sent.content),
                )),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send message");
                SendMessageResponse::new(
                    ResponseCode::Failure,
                    Some(UserActivity::messaging(
                        ActivityKind::UnknownError,
                        Some(content.to_string()),
                    )),
                )
            }
        };
        Ok(response)
    }
}
