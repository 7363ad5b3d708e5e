use crate::config::Config;
use crate::event::{create_event_channel, EventSender};
use crate::provider::{HttpProvider, TelephonyProvider};
use crate::store::{Store, StoreRef};
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

pub struct AppStateInner {
    pub config: Arc<Config>,
    pub store: StoreRef,
    pub provider: Arc<dyn TelephonyProvider>,
    pub events: EventSender,
    pub token: CancellationToken,
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateBuilder {
    pub config: Option<Config>,
    pub provider: Option<Arc<dyn TelephonyProvider>>,
    pub store: Option<StoreRef>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            provider: None,
            store: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn TelephonyProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn store(mut self, store: StoreRef) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> AppState {
        let config = Arc::new(self.config.unwrap_or_default());
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(HttpProvider::new(&config.provider)));
        Arc::new(AppStateInner {
            config,
            store: self.store.unwrap_or_else(Store::new),
            provider,
            events: create_event_channel(),
            token: CancellationToken::new(),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn run(state: AppState) -> Result<()> {
    let token = state.token.clone();

    let app = create_router(state.clone());
    let addr: SocketAddr = state.config.http_addr.parse()?;
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            return Err(anyhow::anyhow!("Failed to bind to {}: {}", addr, e));
        }
    };

    let http_task = async {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    };

    let sync_task = sync_loop(state.clone());

    select! {
        http_result = http_task => {
            match http_result {
                Ok(_) => info!("Server shut down gracefully"),
                Err(e) => {
                    tracing::error!("Server error: {}", e);
                    return Err(anyhow::anyhow!("Server error: {}", e));
                }
            }
        }
        _ = sync_task => {}
        _ = token.cancelled() => {
            info!("Application shutting down due to cancellation");
        }
    }
    token.cancel();
    Ok(())
}

// Periodically fold call logs into lead calling history.
async fn sync_loop(state: AppState) {
    let interval = Duration::from_secs(state.config.sync_interval_secs.max(1));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let updated = state.store.sync_call_records().await;
        if updated > 0 {
            info!(updated, "call history sync");
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    // CORS configuration to allow cross-origin requests from the CRM UI
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            axum::http::header::ORIGIN,
        ]);

    crate::handler::router().with_state(state).layer(cors)
}
