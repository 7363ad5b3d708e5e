use crate::config::ProviderConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::info;

/// User entry as returned by the telephony cloud `/v1/users` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: u64,
    #[serde(default)]
    pub login_id: Option<String>,
    #[serde(default)]
    pub is_login_based_calling_enabled: bool,
    #[serde(default)]
    pub is_international_outbound_enabled: bool,
    #[serde(default)]
    pub agent: Option<ProviderAgent>,
    #[serde(default)]
    pub user_role: Option<ProviderRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderAgent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub follow_me_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderRole {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClickToCallResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HangupResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    data: Vec<ProviderUser>,
}

/// Remote telephony cloud operations used by the HTTP handlers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    /// Place a click-to-call between an agent and a destination number.
    /// Returns the provider call id.
    async fn click_to_call(
        &self,
        agent_number: &str,
        destination_number: &str,
        caller_id: &str,
    ) -> Result<String>;

    async fn hangup(&self, call_id: &str) -> Result<()>;

    async fn list_users(&self) -> Result<Vec<ProviderUser>>;
}

/// Reqwest-backed provider client with bearer authentication.
pub struct HttpProvider {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl TelephonyProvider for HttpProvider {
    async fn click_to_call(
        &self,
        agent_number: &str,
        destination_number: &str,
        caller_id: &str,
    ) -> Result<String> {
        let payload = json!({
            "agent_number": agent_number,
            "destination_number": destination_number,
            "caller_id": caller_id,
            "async": 1,
            "get_call_id": 1,
        });

        let start_time = Instant::now();
        let response = self
            .client
            .post(self.url("/v1/click_to_call"))
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?
            .json::<ClickToCallResponse>()
            .await?;

        info!(
            agent_number,
            destination_number,
            elapsed = start_time.elapsed().as_millis(),
            success = response.success,
            "click to call"
        );

        if !response.success {
            return Err(anyhow!(
                "click to call failed: {}",
                response.message.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        response
            .call_id
            .ok_or_else(|| anyhow!("click to call succeeded without a call id"))
    }

    async fn hangup(&self, call_id: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("/v1/hangup_call"))
            .bearer_auth(&self.api_token)
            .json(&json!({ "call_id": call_id }))
            .send()
            .await?
            .json::<HangupResponse>()
            .await?;

        info!(call_id, success = response.success, "hangup call");
        if !response.success {
            return Err(anyhow!(
                "hangup failed: {}",
                response.message.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<ProviderUser>> {
        let response = self
            .client
            .get(self.url("/v1/users"))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("failed to fetch users, status code: {}", status));
        }
        let users = response.json::<UsersResponse>().await?;
        info!(count = users.data.len(), "fetched provider users");
        Ok(users.data)
    }
}
