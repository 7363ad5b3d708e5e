use crate::app::{AppState, AppStateBuilder};
use crate::callrecord::CallRecordWebhook;
use crate::config::Config;
use crate::handler::call::{
    hangup_call, inbound_call, initiate_call, HangupRequest, InboundCallNotification,
    InitiateCallRequest,
};
use crate::handler::users::sync_users;
use crate::handler::webhook::call_record_webhook;
use crate::provider::{MockTelephonyProvider, ProviderAgent, ProviderRole, ProviderUser};
use crate::store::{Lead, TelephonyUser, UserStatus};
use axum::extract::{Json, State};
use std::sync::Arc;

fn test_state(provider: MockTelephonyProvider) -> AppState {
    AppStateBuilder::new()
        .config(Config::default())
        .provider(Arc::new(provider))
        .build()
}

fn roster_user(id: u64, name: &str, agent_id: &str, follow_me: &str) -> ProviderUser {
    ProviderUser {
        id,
        login_id: Some(format!("login-{}", id)),
        is_login_based_calling_enabled: true,
        is_international_outbound_enabled: false,
        agent: Some(ProviderAgent {
            id: Some(agent_id.to_string()),
            name: Some(name.to_string()),
            status: Some(0),
            follow_me_number: Some(follow_me.to_string()),
        }),
        user_role: Some(ProviderRole {
            name: Some("Agent".to_string()),
        }),
    }
}

#[tokio::test]
async fn test_inbound_call_publishes_notification() {
    let state = test_state(MockTelephonyProvider::new());
    let lead_name = state
        .store
        .insert_lead(Lead::new("Jane Doe", "15551234567"))
        .await;

    let mut event_rx = state.events.subscribe();
    let response = inbound_call(
        State(state.clone()),
        Json(InboundCallNotification {
            caller_id_number: "15551234567".to_string(),
        }),
    )
    .await;

    assert_eq!(response.0["success"], true);
    let event = event_rx.try_recv().unwrap();
    assert_eq!(event.caller_number, "15551234567");
    assert_eq!(event.lead_name.as_deref(), Some("Jane Doe"));
    assert_eq!(event.lead_id.as_deref(), Some(lead_name.as_str()));

    // Lead got a call comment
    let lead = state.store.get_lead(&lead_name).await.unwrap();
    assert_eq!(lead.comments.len(), 1);
}

#[tokio::test]
async fn test_inbound_call_without_matching_lead() {
    let state = test_state(MockTelephonyProvider::new());
    let response = inbound_call(
        State(state),
        Json(InboundCallNotification {
            caller_id_number: "10000000000".to_string(),
        }),
    )
    .await;
    assert_eq!(response.0["success"], false);
    assert_eq!(response.0["message"], "No matching lead found");
}

#[tokio::test]
async fn test_initiate_call_stores_call_id_on_lead() {
    let mut provider = MockTelephonyProvider::new();
    provider
        .expect_click_to_call()
        .times(1)
        .returning(|_, _, _| Ok("call-123".to_string()));

    let state = test_state(provider);
    let lead_name = state
        .store
        .insert_lead(Lead::new("Jane Doe", "15551234567"))
        .await;
    state
        .store
        .insert_telephony_user(TelephonyUser {
            id: 1,
            agent_name: Some("Agent One".to_string()),
            phone_number: Some("9876543210".to_string()),
            login_id: None,
            status: Some(UserStatus::Enabled),
            role: None,
            login_based_calling_enabled: true,
            international_outbound_enabled: false,
            agent_number: Some("agent-1".to_string()),
            user: None,
        })
        .await;

    let response = initiate_call(
        State(state.clone()),
        Json(InitiateCallRequest {
            lead: lead_name.clone(),
            agent: "Agent One".to_string(),
            client_number: "15551234567".to_string(),
        }),
    )
    .await;

    assert_eq!(response.0["success"], true);
    let lead = state.store.get_lead(&lead_name).await.unwrap();
    assert_eq!(lead.call_id.as_deref(), Some("call-123"));
}

#[tokio::test]
async fn test_initiate_call_unknown_agent() {
    let state = test_state(MockTelephonyProvider::new());
    let response = initiate_call(
        State(state),
        Json(InitiateCallRequest {
            lead: "LEAD-X".to_string(),
            agent: "Nobody".to_string(),
            client_number: "15551234567".to_string(),
        }),
    )
    .await;
    assert_eq!(response.0["success"], false);
}

#[tokio::test]
async fn test_hangup_clears_call_id() {
    let mut provider = MockTelephonyProvider::new();
    provider.expect_hangup().times(1).returning(|_| Ok(()));

    let state = test_state(provider);
    let mut lead = Lead::new("Jane Doe", "15551234567");
    lead.call_id = Some("call-123".to_string());
    let lead_name = state.store.insert_lead(lead).await;

    let response = hangup_call(
        State(state.clone()),
        Json(HangupRequest {
            lead: lead_name.clone(),
        }),
    )
    .await;

    assert_eq!(response.0["success"], true);
    let lead = state.store.get_lead(&lead_name).await.unwrap();
    assert!(lead.call_id.is_none());
}

#[tokio::test]
async fn test_hangup_without_active_call() {
    let state = test_state(MockTelephonyProvider::new());
    let lead_name = state
        .store
        .insert_lead(Lead::new("Jane Doe", "15551234567"))
        .await;

    let response = hangup_call(State(state), Json(HangupRequest { lead: lead_name })).await;
    assert_eq!(response.0["success"], false);
    assert_eq!(response.0["message"], "No active call for this lead");
}

#[tokio::test]
async fn test_webhook_rejects_missing_call_id() {
    let state = test_state(MockTelephonyProvider::new());
    let response = call_record_webhook(State(state), Json(CallRecordWebhook::default())).await;
    assert_eq!(response.0["success"], false);
}

#[tokio::test]
async fn test_webhook_missed_inbound_creates_lead() {
    let state = test_state(MockTelephonyProvider::new());
    let response = call_record_webhook(
        State(state.clone()),
        Json(CallRecordWebhook {
            call_id: Some("c-1".to_string()),
            uuid: Some("u-1".to_string()),
            direction: Some("inbound".to_string()),
            customer_no_with_prefix: Some("+15551234567".to_string()),
            hangup_cause: Some("NO_ANSWER".to_string()),
            start_stamp: Some("2025-03-01 10:30:00".to_string()),
            ..Default::default()
        }),
    )
    .await;

    assert_eq!(response.0["success"], true);
    let lead = state.store.find_lead_by_mobile("15551234567").await.unwrap();
    assert_eq!(lead.first_name, "Student");
    assert_eq!(lead.source.as_deref(), Some("Missed Calls"));
    // Webhook ingestion also refreshes calling history
    assert_eq!(lead.calling_history.len(), 1);
}

#[tokio::test]
async fn test_sync_users_saves_and_skips() {
    let mut provider = MockTelephonyProvider::new();
    provider.expect_list_users().times(1).returning(|| {
        Ok(vec![
            roster_user(1, "Agent One", "agent-1", "+91 98765-43210"),
            roster_user(2, "Agent Two", "agent-2", "+91 98765-00000"),
        ])
    });

    let state = test_state(provider);
    // Agent One is already in the roster and must be skipped
    state
        .store
        .insert_telephony_user(TelephonyUser {
            id: 1,
            agent_name: Some("Agent One".to_string()),
            phone_number: None,
            login_id: None,
            status: None,
            role: None,
            login_based_calling_enabled: false,
            international_outbound_enabled: false,
            agent_number: None,
            user: None,
        })
        .await;
    state.store.add_crm_user("9876500000", "two@example.com").await;

    let response = sync_users(State(state.clone())).await;
    assert_eq!(response.0["success"], true);
    assert_eq!(response.0["saved"], 1);
    assert_eq!(response.0["skipped"], 1);
    assert_eq!(response.0["all_existing"], false);

    let saved = state.store.telephony_user("Agent Two").await.unwrap();
    assert_eq!(saved.phone_number.as_deref(), Some("9876500000"));
    assert_eq!(saved.status, Some(UserStatus::Enabled));
    assert_eq!(saved.user.as_deref(), Some("two@example.com"));
    assert_eq!(saved.agent_number.as_deref(), Some("agent-2"));
}

#[tokio::test]
async fn test_sync_users_all_existing() {
    let mut provider = MockTelephonyProvider::new();
    provider
        .expect_list_users()
        .times(1)
        .returning(|| Ok(vec![roster_user(1, "Agent One", "agent-1", "+919876543210")]));

    let state = test_state(provider);
    state
        .store
        .insert_telephony_user(TelephonyUser {
            id: 1,
            agent_name: Some("Agent One".to_string()),
            phone_number: None,
            login_id: None,
            status: None,
            role: None,
            login_based_calling_enabled: false,
            international_outbound_enabled: false,
            agent_number: None,
            user: None,
        })
        .await;

    let response = sync_users(State(state)).await;
    assert_eq!(response.0["all_existing"], true);
    assert_eq!(response.0["message"], "All users already exist in the system");
}

#[tokio::test]
async fn test_sync_users_empty_roster() {
    let mut provider = MockTelephonyProvider::new();
    provider.expect_list_users().times(1).returning(|| Ok(vec![]));

    let state = test_state(provider);
    let response = sync_users(State(state)).await;
    assert_eq!(response.0["success"], true);
    assert_eq!(response.0["message"], "No users found in the API response");
    assert_eq!(response.0["all_existing"], false);
}
