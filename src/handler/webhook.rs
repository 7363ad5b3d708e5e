use crate::app::AppState;
use crate::callrecord::{CallRecord, CallRecordWebhook, CallStatus, CallType};
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::{info, warn};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/webhooks/call-record", post(call_record_webhook))
}

/// Ingest a call record webhook from the telephony cloud: store the log,
/// create a lead for missed inbound calls, and refresh lead calling history.
pub async fn call_record_webhook(
    State(state): State<AppState>,
    Json(data): Json<CallRecordWebhook>,
) -> Json<Value> {
    let record = match CallRecord::from_webhook(&data) {
        Some(record) => record,
        None => {
            warn!("webhook rejected, missing call id");
            return Json(json!({
                "success": false,
                "message": "Invalid webhook data: Missing call UUID",
            }));
        }
    };

    let customer_number = record.customer_number.clone();
    let missed_inbound =
        record.call_type == CallType::Inbound && record.status == CallStatus::Missed;

    let inserted = state.store.insert_call_record(record).await;
    if inserted && missed_inbound {
        state
            .store
            .create_lead_for_missed_call(&customer_number)
            .await;
    }
    state.store.sync_call_records().await;

    info!(customer_number, inserted, "call record webhook processed");
    Json(json!({
        "success": true,
        "message": "Webhook data processed successfully",
    }))
}
