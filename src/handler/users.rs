use crate::app::AppState;
use crate::phone::clean_phone_number;
use crate::store::{TelephonyUser, UserStatus};
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::{error, info};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/users/sync", post(sync_users))
}

/// Pull the provider's agent roster and save the users not yet known to the
/// CRM. Existing provider ids are skipped, never updated.
pub async fn sync_users(State(state): State<AppState>) -> Json<Value> {
    let api_users = match state.provider.list_users().await {
        Ok(users) => users,
        Err(e) => {
            error!("failed to fetch users: {}", e);
            return Json(json!({
                "success": false,
                "message": format!("Failed to fetch users: {}", e),
            }));
        }
    };

    if api_users.is_empty() {
        return Json(json!({
            "success": true,
            "message": "No users found in the API response",
            "users": [],
            "skipped": 0,
            "saved": 0,
            "all_existing": false,
        }));
    }

    let total = api_users.len();
    let mut saved_users = Vec::new();
    let mut skipped = 0usize;

    for api_user in api_users {
        if state.store.telephony_user_exists(api_user.id).await {
            skipped += 1;
            continue;
        }

        let agent = api_user.agent.unwrap_or_default();
        let role = api_user.user_role.unwrap_or_default();

        let phone_number = agent
            .follow_me_number
            .as_deref()
            .and_then(clean_phone_number);
        let crm_user = match phone_number.as_deref() {
            Some(phone) => state.store.find_crm_user_by_mobile(phone).await,
            None => None,
        };

        let user = TelephonyUser {
            id: api_user.id,
            agent_name: agent.name,
            phone_number,
            login_id: api_user.login_id,
            status: agent.status.and_then(UserStatus::from_code),
            role: role.name,
            login_based_calling_enabled: api_user.is_login_based_calling_enabled,
            international_outbound_enabled: api_user.is_international_outbound_enabled,
            agent_number: agent.id,
            user: crm_user,
        };

        state.store.insert_telephony_user(user.clone()).await;
        saved_users.push(user);
    }

    let all_existing = skipped == total;
    let saved = saved_users.len();
    info!(saved, skipped, all_existing, "user roster sync finished");

    Json(json!({
        "success": true,
        "users": saved_users,
        "skipped": skipped,
        "saved": saved,
        "all_existing": all_existing,
        "message": if all_existing {
            Some("All users already exist in the system")
        } else {
            None
        },
    }))
}
