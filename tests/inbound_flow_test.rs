use callpop::app::{create_router, AppState, AppStateBuilder};
use callpop::config::Config;
use callpop::store::Lead;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio_tungstenite::tungstenite::Message;

async fn spawn_server() -> (AppState, SocketAddr) {
    let state = AppStateBuilder::new().config(Config::default()).build();
    let app = create_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (state, addr)
}

async fn next_json<S>(ws: &mut S) -> Value
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match ws.next().await.expect("feed closed").expect("ws error") {
            Message::Text(text) => return serde_json::from_str(&text).expect("invalid json"),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_inbound_call_reaches_ws_client() {
    let (state, addr) = spawn_server().await;
    let lead_name = state
        .store
        .insert_lead(Lead::new("Jane Doe", "15551234567"))
        .await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("connect ws feed");

    let connected = next_json(&mut ws).await;
    assert_eq!(connected["type"], "connected");

    let client = reqwest::Client::new();
    let response: Value = client
        .post(format!("http://{}/api/calls/inbound", addr))
        .json(&json!({ "caller_id_number": "15551234567" }))
        .send()
        .await
        .expect("post inbound call")
        .json()
        .await
        .expect("parse response");
    assert_eq!(response["success"], true);

    let notification = next_json(&mut ws).await;
    assert_eq!(notification["type"], "inbound_call_notification");
    assert_eq!(notification["data"]["caller_number"], "15551234567");
    assert_eq!(notification["data"]["lead_name"], "Jane Doe");
    assert_eq!(notification["data"]["lead_id"], lead_name.as_str());
}

#[tokio::test]
async fn test_unmatched_caller_is_not_broadcast() {
    let (_state, addr) = spawn_server().await;

    let client = reqwest::Client::new();
    let response: Value = client
        .post(format!("http://{}/api/calls/inbound", addr))
        .json(&json!({ "caller_id_number": "19990000000" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "No matching lead found");
}

#[tokio::test]
async fn test_missed_call_webhook_creates_matchable_lead() {
    let (state, addr) = spawn_server().await;
    let client = reqwest::Client::new();

    // A missed inbound call from an unknown number creates a lead...
    let response: Value = client
        .post(format!("http://{}/api/webhooks/call-record", addr))
        .json(&json!({
            "call_id": "c-500",
            "uuid": "u-500",
            "direction": "inbound",
            "customer_no_with_prefix": "+15550009999",
            "hangup_cause": "NO_ANSWER",
            "start_stamp": "2025-03-01 10:30:00",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["success"], true);

    let lead = state
        .store
        .find_lead_by_mobile("15550009999")
        .await
        .expect("lead created for missed call");
    assert_eq!(lead.first_name, "Student");

    // ...so the next call from that number produces a notification
    let response: Value = client
        .post(format!("http://{}/api/calls/inbound", addr))
        .json(&json!({ "caller_id_number": "15550009999" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["success"], true);

    // Duplicate webhook deliveries are ignored
    let response: Value = client
        .post(format!("http://{}/api/webhooks/call-record", addr))
        .json(&json!({
            "call_id": "c-501",
            "uuid": "u-500",
            "direction": "inbound",
            "customer_no_with_prefix": "+15550009999",
            "hangup_cause": "NO_ANSWER",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["success"], true);
    assert_eq!(state.store.call_records_for("15550009999").await.len(), 1);
}
