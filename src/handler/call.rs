use crate::app::AppState;
use crate::event::CallEvent;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/calls/initiate", post(initiate_call))
        .route("/api/calls/hangup", post(hangup_call))
        .route("/api/calls/inbound", post(inbound_call))
}

#[derive(Debug, Deserialize)]
pub struct InitiateCallRequest {
    pub lead: String,
    pub agent: String,
    pub client_number: String,
}

#[derive(Debug, Deserialize)]
pub struct HangupRequest {
    pub lead: String,
}

/// Notification from the telephony cloud that an inbound call is ringing.
#[derive(Debug, Deserialize)]
pub struct InboundCallNotification {
    pub caller_id_number: String,
}

pub async fn initiate_call(
    State(state): State<AppState>,
    Json(params): Json<InitiateCallRequest>,
) -> Json<Value> {
    let agent = match state.store.telephony_user(&params.agent).await {
        Some(agent) => agent,
        None => {
            return Json(json!({
                "success": false,
                "message": format!("Unknown agent: {}", params.agent),
            }));
        }
    };
    let agent_number = match agent.agent_number {
        Some(agent_number) => agent_number,
        None => {
            return Json(json!({
                "success": false,
                "message": "No phone number found for the selected agent.",
            }));
        }
    };

    match state
        .provider
        .click_to_call(
            &agent_number,
            &params.client_number,
            &state.config.provider.did_number,
        )
        .await
    {
        Ok(call_id) => {
            info!(
                lead = params.lead,
                agent = params.agent,
                call_id,
                "call initiated"
            );
            state
                .store
                .set_lead_call_id(&params.lead, Some(call_id))
                .await;
            Json(json!({
                "success": true,
                "message": "Call initiated successfully",
            }))
        }
        Err(e) => {
            error!(lead = params.lead, "click to call error: {}", e);
            Json(json!({
                "success": false,
                "message": format!("Failed to initiate call: {}", e),
            }))
        }
    }
}

pub async fn hangup_call(
    State(state): State<AppState>,
    Json(params): Json<HangupRequest>,
) -> Json<Value> {
    let lead = match state.store.get_lead(&params.lead).await {
        Some(lead) => lead,
        None => {
            return Json(json!({
                "success": false,
                "message": format!("Unknown lead: {}", params.lead),
            }));
        }
    };
    let call_id = match lead.call_id {
        Some(call_id) => call_id,
        None => {
            return Json(json!({
                "success": false,
                "message": "No active call for this lead",
            }));
        }
    };

    match state.provider.hangup(&call_id).await {
        Ok(()) => {
            state.store.set_lead_call_id(&params.lead, None).await;
            Json(json!({
                "success": true,
                "message": "Call hung up successfully",
            }))
        }
        Err(e) => {
            error!(lead = params.lead, call_id, "hangup call error: {}", e);
            Json(json!({
                "success": false,
                "message": format!("Failed to hang up call: {}", e),
            }))
        }
    }
}

/// Match the caller to a lead and push an inbound call notification to all
/// connected agent clients.
pub async fn inbound_call(
    State(state): State<AppState>,
    Json(params): Json<InboundCallNotification>,
) -> Json<Value> {
    let lead = match state.store.find_lead_by_mobile(&params.caller_id_number).await {
        Some(lead) => lead,
        None => {
            return Json(json!({
                "success": false,
                "message": "No matching lead found",
            }));
        }
    };

    state
        .store
        .add_lead_comment(
            &lead.name,
            format!("Incoming call received from {}", params.caller_id_number),
        )
        .await;

    let event = CallEvent {
        caller_number: params.caller_id_number.clone(),
        lead_name: Some(lead.first_name.clone()),
        lead_id: Some(lead.name.clone()),
    };
    // No receivers connected is not an error
    let _ = state.events.send(event);

    info!(
        caller_number = params.caller_id_number,
        lead = lead.name,
        "inbound call notification published"
    );
    Json(json!({
        "success": true,
        "message": "Lead call notification sent successfully",
    }))
}
