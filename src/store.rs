use crate::callrecord::{CallRecord, CallStatus, CallType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// A CRM lead. `name` is the record identifier used for navigation and
/// click-to-call bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub first_name: String,
    pub source: Option<String>,
    pub mobile_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_status: Option<CallStatus>,
    #[serde(default)]
    pub calling_history: Vec<CallHistoryEntry>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Lead {
    pub fn new(first_name: impl Into<String>, mobile_no: impl Into<String>) -> Self {
        Self {
            name: format!("LEAD-{}", &Uuid::new_v4().simple().to_string()[..8]),
            first_name: first_name.into(),
            source: None,
            mobile_no: mobile_no.into(),
            call_id: None,
            call_status: None,
            calling_history: Vec::new(),
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallHistoryEntry {
    pub call_id: String,
    pub agent_name: Option<String>,
    pub call_type: CallType,
    pub status: CallStatus,
    pub call_date: String,
    pub call_time: String,
    pub duration: Option<u64>,
}

impl CallHistoryEntry {
    fn from_record(record: &CallRecord) -> Self {
        Self {
            call_id: record.call_id.clone(),
            agent_name: record.agent_name.clone(),
            call_type: record.call_type,
            status: record.status,
            call_date: record.call_date(),
            call_time: record.call_time(),
            duration: record.duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Enabled,
    Blocked,
    Disabled,
}

impl UserStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(UserStatus::Enabled),
            1 => Some(UserStatus::Blocked),
            2 => Some(UserStatus::Disabled),
            _ => None,
        }
    }
}

/// A telephony cloud user synced into the CRM roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephonyUser {
    pub id: u64,
    pub agent_name: Option<String>,
    pub phone_number: Option<String>,
    pub login_id: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<String>,
    pub login_based_calling_enabled: bool,
    pub international_outbound_enabled: bool,
    /// Provider-side agent identifier used for click-to-call.
    pub agent_number: Option<String>,
    /// Matched CRM user, by mobile number.
    pub user: Option<String>,
}

#[derive(Default)]
struct StoreInner {
    leads: HashMap<String, Lead>,
    call_records: Vec<CallRecord>,
    record_uuids: HashSet<String>,
    telephony_users: HashMap<u64, TelephonyUser>,
    // mobile number -> CRM user id
    crm_users: HashMap<String, String>,
}

/// In-memory CRM store shared by the HTTP handlers.
#[derive(Default)]
pub struct Store {
    inner: RwLock<StoreInner>,
}

pub type StoreRef = Arc<Store>;

impl Store {
    pub fn new() -> StoreRef {
        Arc::new(Self::default())
    }

    pub async fn insert_lead(&self, lead: Lead) -> String {
        let name = lead.name.clone();
        self.inner.write().await.leads.insert(name.clone(), lead);
        name
    }

    pub async fn get_lead(&self, name: &str) -> Option<Lead> {
        self.inner.read().await.leads.get(name).cloned()
    }

    pub async fn find_lead_by_mobile(&self, mobile_no: &str) -> Option<Lead> {
        self.inner
            .read()
            .await
            .leads
            .values()
            .find(|lead| lead.mobile_no == mobile_no)
            .cloned()
    }

    pub async fn set_lead_call_id(&self, name: &str, call_id: Option<String>) -> bool {
        match self.inner.write().await.leads.get_mut(name) {
            Some(lead) => {
                lead.call_id = call_id;
                true
            }
            None => false,
        }
    }

    pub async fn add_lead_comment(&self, name: &str, comment: impl Into<String>) -> bool {
        match self.inner.write().await.leads.get_mut(name) {
            Some(lead) => {
                lead.comments.push(comment.into());
                true
            }
            None => false,
        }
    }

    /// Create a lead for a missed inbound call unless one already exists for
    /// the number.
    pub async fn create_lead_for_missed_call(&self, phone_number: &str) -> Option<String> {
        let mut inner = self.inner.write().await;
        if inner
            .leads
            .values()
            .any(|lead| lead.mobile_no == phone_number)
        {
            return None;
        }
        let mut lead = Lead::new("Student", phone_number);
        lead.source = Some("Missed Calls".to_string());
        let name = lead.name.clone();
        info!(lead = name, phone_number, "created lead for missed call");
        inner.leads.insert(name.clone(), lead);
        Some(name)
    }

    /// Insert a call record, skipping duplicates by provider uuid. Returns
    /// false when the record already existed.
    pub async fn insert_call_record(&self, record: CallRecord) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.record_uuids.insert(record.uuid.clone()) {
            debug!(uuid = record.uuid, "call log already exists");
            return false;
        }
        inner.call_records.push(record);
        true
    }

    pub async fn call_records_for(&self, customer_number: &str) -> Vec<CallRecord> {
        let inner = self.inner.read().await;
        let mut records: Vec<CallRecord> = inner
            .call_records
            .iter()
            .filter(|record| record.customer_number == customer_number)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        records
    }

    pub async fn telephony_user_exists(&self, id: u64) -> bool {
        self.inner.read().await.telephony_users.contains_key(&id)
    }

    pub async fn insert_telephony_user(&self, user: TelephonyUser) {
        self.inner
            .write()
            .await
            .telephony_users
            .insert(user.id, user);
    }

    pub async fn telephony_user(&self, agent_name: &str) -> Option<TelephonyUser> {
        self.inner
            .read()
            .await
            .telephony_users
            .values()
            .find(|user| user.agent_name.as_deref() == Some(agent_name))
            .cloned()
    }

    pub async fn add_crm_user(&self, mobile_no: impl Into<String>, user: impl Into<String>) {
        self.inner
            .write()
            .await
            .crm_users
            .insert(mobile_no.into(), user.into());
    }

    pub async fn find_crm_user_by_mobile(&self, mobile_no: &str) -> Option<String> {
        self.inner.read().await.crm_users.get(mobile_no).cloned()
    }

    /// Sync call logs into each matching lead's calling history and update
    /// the lead's call status from the latest log.
    pub async fn sync_call_records(&self) -> usize {
        let mut inner = self.inner.write().await;
        let StoreInner {
            leads,
            call_records,
            ..
        } = &mut *inner;

        let mut updated = 0;
        for lead in leads.values_mut() {
            if lead.mobile_no.is_empty() {
                continue;
            }
            let mut records: Vec<&CallRecord> = call_records
                .iter()
                .filter(|record| record.customer_number == lead.mobile_no)
                .collect();
            if records.is_empty() {
                continue;
            }
            records.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            lead.call_status = Some(records[0].status);

            for record in records {
                let entry = CallHistoryEntry::from_record(record);
                match lead
                    .calling_history
                    .iter()
                    .position(|existing| existing.call_id == record.call_id)
                {
                    Some(idx) => lead.calling_history[idx] = entry,
                    None => lead.calling_history.push(entry),
                }
            }
            updated += 1;
        }
        updated
    }
}
