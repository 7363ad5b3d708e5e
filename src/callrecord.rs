use crate::phone::{format_agent_number, format_phone_number};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallType {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallStatus {
    Answered,
    Missed,
    Failed,
}

impl CallStatus {
    /// Determine call status from provider webhook data: an explicit status
    /// wins, otherwise a NO_ANSWER hangup cause means missed, otherwise
    /// billed seconds decide answered vs failed.
    ///
    /// Providers emit free-form status strings. Anything outside the three
    /// known values falls through to the hangup-cause/billsec rules so the
    /// stored status stays within this enum.
    pub fn derive(
        call_status: Option<&str>,
        hangup_cause: Option<&str>,
        billsec: Option<u64>,
    ) -> CallStatus {
        if let Some(status) = call_status {
            match status.to_ascii_lowercase().as_str() {
                "answered" => return CallStatus::Answered,
                "missed" => return CallStatus::Missed,
                "failed" => return CallStatus::Failed,
                _ => {}
            }
        }
        if hangup_cause == Some("NO_ANSWER") {
            CallStatus::Missed
        } else if billsec.unwrap_or(0) > 0 {
            CallStatus::Answered
        } else {
            CallStatus::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Answered => "Answered",
            CallStatus::Missed => "Missed",
            CallStatus::Failed => "Failed",
        }
    }
}

/// Call record webhook payload as delivered by the telephony cloud.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallRecordWebhook {
    #[serde(default)]
    pub call_id: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub answered_agent_name: Option<String>,
    #[serde(default)]
    pub answered_agent_number: Option<String>,
    #[serde(default)]
    pub customer_no_with_prefix: Option<String>,
    #[serde(default)]
    pub start_stamp: Option<String>,
    #[serde(default)]
    pub end_stamp: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub call_status: Option<String>,
    #[serde(default)]
    pub hangup_cause: Option<String>,
    #[serde(default)]
    pub billsec: Option<u64>,
    #[serde(default)]
    pub missed_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissedAgent {
    pub agent_name: Option<String>,
    pub number: String,
}

/// A stored call log entry, deduplicated by the provider `uuid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: String,
    pub uuid: String,
    pub agent_name: Option<String>,
    pub agent_phone_number: Option<String>,
    pub customer_number: String,
    pub call_type: CallType,
    pub status: CallStatus,
    pub start_time: DateTime<Utc>,
    pub end_stamp: Option<String>,
    pub duration: Option<u64>,
    pub recording_url: Option<String>,
    pub missed_agents: Vec<MissedAgent>,
}

impl CallRecord {
    /// Build a call log entry from webhook data. Returns None when the
    /// payload has no call id.
    pub fn from_webhook(data: &CallRecordWebhook) -> Option<Self> {
        let call_id = data.call_id.clone()?;
        let customer_number =
            format_phone_number(data.customer_no_with_prefix.as_deref().unwrap_or(""));
        let agent_phone_number = data
            .answered_agent_number
            .as_deref()
            .map(format_agent_number);

        let call_type = if data.direction.as_deref() == Some("clicktocall") {
            CallType::Outbound
        } else {
            CallType::Inbound
        };

        let start_time = data
            .start_stamp
            .as_deref()
            .and_then(parse_stamp)
            .unwrap_or_else(Utc::now);

        Some(Self {
            uuid: data.uuid.clone().unwrap_or_else(|| call_id.clone()),
            call_id,
            agent_name: data.answered_agent_name.clone(),
            agent_phone_number,
            customer_number,
            call_type,
            status: CallStatus::derive(
                data.call_status.as_deref(),
                data.hangup_cause.as_deref(),
                data.billsec,
            ),
            start_time,
            end_stamp: data.end_stamp.clone(),
            duration: data.duration,
            recording_url: data.recording_url.clone(),
            missed_agents: data
                .missed_agent
                .iter()
                .map(|number| MissedAgent {
                    agent_name: None,
                    number: number.clone(),
                })
                .collect(),
        })
    }

    pub fn call_date(&self) -> String {
        self.start_time.format("%Y-%m-%d").to_string()
    }

    pub fn call_time(&self) -> String {
        self.start_time.format("%H:%M:%S").to_string()
    }
}

fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
