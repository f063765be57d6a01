use serde::{Deserialize, Serialize};

use crate::{Display, DocumentId};

/// Events pushed to subscribers of a display or of the global channel
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SignageEvent {
    /// Sent once to a subscriber right after it connects
    Connected(ConnectedPayload),
    /// A display, or something shown on it, changed
    DisplayUpdated(DisplayUpdatedPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectedPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayUpdatedPayload {
    pub display_id: DocumentId,
    pub action: DisplayAction,
    /// The refreshed document, absent when the display is gone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayAction {
    Create,
    Update,
    Delete,
}

impl SignageEvent {
    pub fn connected(message: impl Into<String>) -> Self {
        Self::Connected(ConnectedPayload {
            message: message.into(),
        })
    }

    pub fn display_updated(
        display_id: DocumentId,
        action: DisplayAction,
        display: Option<Display>,
    ) -> Self {
        Self::DisplayUpdated(DisplayUpdatedPayload {
            display_id,
            action,
            display,
        })
    }

    /// The SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::DisplayUpdated(_) => "display_updated",
        }
    }
}

/// Formats a single server-sent event frame.
pub fn event_frame(name: &str, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", name, data)
}

/// Formats an SSE comment, which clients ignore.
pub fn comment_frame(comment: &str) -> String {
    format!(": {}\n\n", comment)
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use crate::DocumentId;

    use super::{event_frame, DisplayAction, SignageEvent};

    #[test]
    fn display_updated_payloads_are_camel_case() {
        let id = DocumentId::parse("65a1b2c3d4e5f60718293a4b").unwrap();
        let event = SignageEvent::display_updated(id, DisplayAction::Delete, None);

        assert_eq!(event.name(), "display_updated");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "displayId": "65a1b2c3d4e5f60718293a4b", "action": "delete" })
        );
    }

    #[test]
    fn frames_end_with_a_blank_line() {
        assert_eq!(
            event_frame("connected", r#"{"message":"hi"}"#),
            "event: connected\ndata: {\"message\":\"hi\"}\n\n"
        );
    }
}
