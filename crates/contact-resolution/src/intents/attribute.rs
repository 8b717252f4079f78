//! Set message attribute intent

use serde::{Deserialize, Serialize};

use super::{IntentKind, ResponseCode, UserActivity, ValueResolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageAttribute {
    Read,
    Unread,
    Flagged,
    Unflagged,
}

/// A request to change an attribute of some messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMessageAttributeIntent {
    #[serde(default)]
    pub identifiers: Vec<String>,
    #[serde(default)]
    pub attribute: Option<MessageAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMessageAttributeResponse {
    pub code: ResponseCode,
    pub user_activity: UserActivity,
}

/// Handles set message attribute intents; every message is marked read
#[derive(Debug, Clone, Copy, Default)]
pub struct SetMessageAttributeHandler;

impl SetMessageAttributeHandler {
    pub fn resolve_attribute(
        &self,
        _intent: &SetMessageAttributeIntent,
    ) -> ValueResolution<MessageAttribute> {
        ValueResolution::Success(MessageAttribute::Read)
    }

    pub fn handle(&self, intent: &SetMessageAttributeIntent) -> SetMessageAttributeResponse {
        tracing::debug!(messages = intent.identifiers.len(), "Set message attribute");
        SetMessageAttributeResponse {
            code: ResponseCode::Success,
            user_activity: UserActivity::for_intent(IntentKind::SetMessageAttribute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_always_resolves_to_read() {
        let intent = SetMessageAttributeIntent {
            identifiers: vec!["0".into()],
            attribute: Some(MessageAttribute::Flagged),
        };
        assert_eq!(
            SetMessageAttributeHandler.resolve_attribute(&intent),
            ValueResolution::Success(MessageAttribute::Read)
        );
        assert_eq!(
            SetMessageAttributeHandler.handle(&intent).code,
            ResponseCode::Success
        );
    }
}
