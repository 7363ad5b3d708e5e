use serde::{Deserialize, Serialize};

/// Payload of an `inbound_call_notification` pushed to connected agents.
///
/// `caller_number` is the de-duplication key for the notification session;
/// the lead fields are present only when the caller matched a CRM lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    /// May be empty when the provider withholds the caller id; the session
    /// renders it as "Unknown".
    #[serde(default)]
    pub caller_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
}

impl CallEvent {
    pub fn new(caller_number: impl Into<String>) -> Self {
        Self {
            caller_number: caller_number.into(),
            lead_name: None,
            lead_id: None,
        }
    }

    pub fn with_lead(
        caller_number: impl Into<String>,
        lead_name: impl Into<String>,
        lead_id: impl Into<String>,
    ) -> Self {
        Self {
            caller_number: caller_number.into(),
            lead_name: Some(lead_name.into()),
            lead_id: Some(lead_id.into()),
        }
    }
}

/// Type alias for the notification event sender
pub type EventSender = tokio::sync::broadcast::Sender<CallEvent>;

/// Type alias for the notification event receiver
pub type EventReceiver = tokio::sync::broadcast::Receiver<CallEvent>;

pub fn create_event_channel() -> EventSender {
    let (sender, _) = tokio::sync::broadcast::channel(64);
    sender
}
