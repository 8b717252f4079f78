//! Host-facing intent handlers
//!
//! The host speaks in terms of [`Person`] values and per-intent requests.
//! This module adapts those to [`User`] queries, runs them through the
//! [`ResolutionEngine`], and answers with host responses and activities.
//!
//! | Intent | Handler | Resolution steps |
//! |---|---|---|
//! | send message | [`SendMessageHandler`] | content, recipients (with phone choice), confirm |
//! | search for messages | [`SearchForMessagesHandler`] | senders (no phone choice) |
//! | set message attribute | [`SetMessageAttributeHandler`] | attribute |

pub mod attribute;
pub mod search;
pub mod send;

pub use attribute::{
    MessageAttribute, SetMessageAttributeHandler, SetMessageAttributeIntent,
    SetMessageAttributeResponse,
};
pub use search::{
    HostMessage, SearchForMessagesHandler, SearchForMessagesIntent, SearchForMessagesResponse,
};
pub use send::{SendMessageHandler, SendMessageIntent, SendMessageResponse};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::contracts::{
    DisambiguationKind, HandleKind, PersonHandle, PersonName, ResolutionOutcome,
    ResolutionRequest, User,
};
use crate::engine::ResolutionEngine;
use crate::messages::MessageLog;

/// Prefix of every activity type raised by the messaging handlers
pub const MESSAGING_ACTIVITY_PREFIX: &str = "com.example.apple-samplecode.Messaging";

/// A person as described by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<PersonHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PersonName>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_identifier: Option<String>,
}

impl Person {
    /// A person known only by a display name
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn with_handle(mut self, handle: PersonHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn with_name(mut self, name: PersonName) -> Self {
        self.name = Some(name);
        self
    }

    /// Query user for the store
    ///
    /// Name components come from `name`, or are recovered from the display
    /// name when the host sent none.
    pub fn to_query_user(&self) -> User {
        let screen_name = self
            .handle
            .as_ref()
            .map(|handle| handle.value.clone())
            .unwrap_or_default();
        let name = self
            .name
            .clone()
            .or_else(|| PersonName::parse(&self.display_name))
            .unwrap_or_default();

        User::new(screen_name).with_name(name)
    }

    /// Host view of a store user
    pub fn from_user(user: &User) -> Self {
        Self {
            handle: Some(PersonHandle::new(user.screen_name.clone(), HandleKind::Unknown)),
            name: Some(user.name()),
            display_name: user.formatted_name(),
            custom_identifier: Some(user.screen_name.clone()),
        }
    }

    /// Host view of a phone-number option: the handle is the number itself
    fn from_phone_option(user: &User) -> Self {
        let handle = match user.phone_numbers.first() {
            Some(phone_number) => PersonHandle::phone(phone_number),
            None => PersonHandle::new(user.screen_name.clone(), HandleKind::PhoneNumber),
        };
        Self {
            handle: Some(handle),
            name: Some(user.name()),
            display_name: user.formatted_name(),
            custom_identifier: None,
        }
    }

    fn phone_handle(&self) -> Option<&PersonHandle> {
        self.handle.as_ref().filter(|handle| handle.is_authoritative())
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.handle {
            Some(handle) if self.display_name.is_empty() => write!(f, "{}", handle.value),
            Some(handle) => write!(f, "{} <{}>", self.display_name, handle.value),
            None => write!(f, "{}", self.display_name),
        }
    }
}

/// Result of resolving one host person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "value", rename_all = "snake_case")]
pub enum PersonResolution {
    Success(Person),
    NeedsValue,
    ConfirmationRequired(Person),
    Disambiguation(Vec<Person>),
    Unsupported,
}

impl PersonResolution {
    /// Host form of an engine outcome
    pub fn from_outcome(outcome: ResolutionOutcome) -> Self {
        match outcome {
            ResolutionOutcome::NeedsValue => PersonResolution::NeedsValue,
            ResolutionOutcome::Success(user) => PersonResolution::Success(Person::from_user(&user)),
            ResolutionOutcome::ConfirmationRequired(user) => {
                PersonResolution::ConfirmationRequired(Person::from_user(&user))
            }
            ResolutionOutcome::Disambiguation { kind, options } => {
                let to_person = match kind {
                    DisambiguationKind::Person => Person::from_user,
                    DisambiguationKind::PhoneNumber => Person::from_phone_option,
                };
                PersonResolution::Disambiguation(options.iter().map(to_person).collect())
            }
            ResolutionOutcome::Unsupported => PersonResolution::Unsupported,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PersonResolution::Success(_))
    }
}

/// Resolve one host person
///
/// A person carrying a phone-number handle is already resolved and is
/// returned unchanged.
pub fn resolve_person(
    engine: &ResolutionEngine,
    person: &Person,
    handle_disambiguation: bool,
) -> PersonResolution {
    if person.phone_handle().is_some() {
        return PersonResolution::Success(person.clone());
    }

    let request = ResolutionRequest::new(person.to_query_user())
        .handle_disambiguation(handle_disambiguation);
    let request = match &person.handle {
        Some(handle) => request.with_handle(handle.clone()),
        None => request,
    };
    PersonResolution::from_outcome(engine.resolve(&request))
}

/// Resolve every person of an intent slot
///
/// A missing or empty slot yields a single `NeedsValue`.
pub fn resolve_people(
    engine: &ResolutionEngine,
    people: Option<&[Person]>,
    handle_disambiguation: bool,
) -> Vec<PersonResolution> {
    match people {
        Some(people) if !people.is_empty() => people
            .iter()
            .map(|person| resolve_person(engine, person, handle_disambiguation))
            .collect(),
        _ => vec![PersonResolution::NeedsValue],
    }
}

/// Resolution of a single-valued intent slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "value", rename_all = "snake_case")]
pub enum ValueResolution<T> {
    Success(T),
    NeedsValue,
}

/// Response codes shared by the intent handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCode {
    Ready,
    Success,
    Failure,
    FailureRequiringAppLaunch,
}

/// Messaging activity kinds handed back to the host app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
    SentMessage,
    LoginRequired,
    UnknownError,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::SentMessage => "sentMessage",
            ActivityKind::LoginRequired => "loginRequired",
            ActivityKind::UnknownError => "unknownError",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "sentMessage" => Some(ActivityKind::SentMessage),
            "loginRequired" => Some(ActivityKind::LoginRequired),
            "unknownError" => Some(ActivityKind::UnknownError),
            _ => None,
        }
    }
}

/// Activity handed to the host app alongside a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UserActivity {
    /// A messaging activity; only sent-message activities keep `info`
    pub fn messaging(kind: ActivityKind, info: Option<String>) -> Self {
        Self {
            activity_type: format!("{}.{}", MESSAGING_ACTIVITY_PREFIX, kind.as_str()),
            message: match kind {
                ActivityKind::SentMessage => info,
                ActivityKind::LoginRequired | ActivityKind::UnknownError => None,
            },
        }
    }

    /// The activity recorded after handling `intent`
    pub fn for_intent(intent: IntentKind) -> Self {
        Self {
            activity_type: intent.activity_type().to_string(),
            message: None,
        }
    }

    /// Messaging kind, if this activity was raised by a messaging handler
    pub fn messaging_kind(&self) -> Option<ActivityKind> {
        let suffix = self
            .activity_type
            .strip_prefix(MESSAGING_ACTIVITY_PREFIX)?
            .strip_prefix('.')?;
        ActivityKind::from_suffix(suffix)
    }
}

/// Intents the extension can handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    SendMessage,
    SearchForMessages,
    SetMessageAttribute,
}

impl IntentKind {
    fn activity_type(&self) -> &'static str {
        match self {
            IntentKind::SendMessage => "SendMessageIntent",
            IntentKind::SearchForMessages => "SearchForMessagesIntent",
            IntentKind::SetMessageAttribute => "SetMessageAttributeIntent",
        }
    }
}

/// The handler chosen for an intent
#[derive(Debug, Clone)]
pub enum IntentHandler {
    SendMessage(SendMessageHandler),
    SearchForMessages(SearchForMessagesHandler),
    SetMessageAttribute(SetMessageAttributeHandler),
}

impl IntentHandler {
    pub fn kind(&self) -> IntentKind {
        match self {
            IntentHandler::SendMessage(_) => IntentKind::SendMessage,
            IntentHandler::SearchForMessages(_) => IntentKind::SearchForMessages,
            IntentHandler::SetMessageAttribute(_) => IntentKind::SetMessageAttribute,
        }
    }
}

/// Hands out intent handlers sharing one engine and one message log
#[derive(Debug, Clone)]
pub struct IntentDispatcher {
    engine: ResolutionEngine,
    log: Arc<MessageLog>,
}

impl IntentDispatcher {
    pub fn new(engine: ResolutionEngine, log: MessageLog) -> Self {
        Self {
            engine,
            log: Arc::new(log),
        }
    }

    pub fn engine(&self) -> &ResolutionEngine {
        &self.engine
    }

    pub fn message_log(&self) -> &MessageLog {
        &self.log
    }

    /// Handler for an intent kind
    pub fn handler_for(&self, kind: IntentKind) -> IntentHandler {
        tracing::debug!(intent = ?kind, "Dispatching intent");
        match kind {
            IntentKind::SendMessage => IntentHandler::SendMessage(SendMessageHandler::new(
                self.engine.clone(),
                Arc::clone(&self.log),
            )),
            IntentKind::SearchForMessages => IntentHandler::SearchForMessages(
                SearchForMessagesHandler::new(self.engine.clone(), Arc::clone(&self.log)),
            ),
            IntentKind::SetMessageAttribute => {
                IntentHandler::SetMessageAttribute(SetMessageAttributeHandler)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::PhoneNumber;
    use crate::store::ContactStore;

    fn engine() -> ResolutionEngine {
        ResolutionEngine::new(ContactStore::new(vec![
            User::new("Evans").with_given_name("Evans").with_family_name("Reily"),
            User::new("jdoe")
                .with_given_name("Jane")
                .with_family_name("Doe")
                .with_phone_number(PhoneNumber::new("mobile", "555-0100"))
                .with_phone_number(PhoneNumber::new("work", "555-0199")),
        ]))
    }

    #[test]
    fn test_query_user_recovers_name_from_display_name() {
        let person = Person::named("Jane Q Doe");
        let user = person.to_query_user();
        assert_eq!(user.screen_name, "");
        assert_eq!(user.given_name.as_deref(), Some("Jane"));
        assert_eq!(user.family_name.as_deref(), Some("Doe"));

        let person = Person::named("ignored")
            .with_handle(PersonHandle::new("jdoe", HandleKind::Unknown))
            .with_name(PersonName::new(Some("Jane"), None));
        let user = person.to_query_user();
        assert_eq!(user.screen_name, "jdoe");
        assert_eq!(user.family_name, None);
    }

    #[test]
    fn test_person_from_user() {
        let user = User::new("jdoe").with_given_name("Jane").with_family_name("Doe");
        let person = Person::from_user(&user);
        assert_eq!(person.display_name, "Jane Doe");
        assert_eq!(person.custom_identifier.as_deref(), Some("jdoe"));
        assert_eq!(person.handle.unwrap().kind, HandleKind::Unknown);
    }

    #[test]
    fn test_phone_handle_person_is_returned_unchanged() {
        let person = Person::named("Someone")
            .with_handle(PersonHandle::phone(&PhoneNumber::new("mobile", "555-0123")));
        assert_eq!(
            resolve_person(&engine(), &person, true),
            PersonResolution::Success(person)
        );
    }

    #[test]
    fn test_phone_disambiguation_yields_phone_persons() {
        let person = Person::named("Jane Doe");
        match resolve_person(&engine(), &person, true) {
            PersonResolution::Disambiguation(options) => {
                assert_eq!(options.len(), 2);
                let handle = options[1].handle.as_ref().unwrap();
                assert_eq!(handle.kind, HandleKind::PhoneNumber);
                assert_eq!(handle.value, "555-0199");
                assert_eq!(handle.label.as_deref(), Some("work"));
                assert_eq!(options[1].display_name, "Jane Doe");

                // Picking an option resolves immediately
                assert!(resolve_person(&engine(), &options[1], true).is_success());
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_people_without_people_needs_value() {
        assert_eq!(
            resolve_people(&engine(), None, true),
            vec![PersonResolution::NeedsValue]
        );
        assert_eq!(
            resolve_people(&engine(), Some(Vec::new().as_slice()), true),
            vec![PersonResolution::NeedsValue]
        );
    }

    #[test]
    fn test_messaging_activity_types() {
        let sent = UserActivity::messaging(ActivityKind::SentMessage, Some("Hi".into()));
        assert_eq!(sent.activity_type, "com.example.apple-samplecode.Messaging.sentMessage");
        assert_eq!(sent.message.as_deref(), Some("Hi"));
        assert_eq!(sent.messaging_kind(), Some(ActivityKind::SentMessage));

        let login = UserActivity::messaging(ActivityKind::LoginRequired, Some("Hi".into()));
        assert_eq!(login.message, None);
        assert_eq!(login.messaging_kind(), Some(ActivityKind::LoginRequired));

        assert_eq!(UserActivity::for_intent(IntentKind::SearchForMessages).messaging_kind(), None);
    }

    #[test]
    fn test_dispatcher_picks_matching_handler() {
        let dispatcher = IntentDispatcher::new(engine(), MessageLog::in_memory());
        for kind in [
            IntentKind::SendMessage,
            IntentKind::SearchForMessages,
            IntentKind::SetMessageAttribute,
        ] {
            assert_eq!(dispatcher.handler_for(kind).kind(), kind);
        }
    }
}
