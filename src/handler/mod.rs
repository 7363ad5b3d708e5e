use crate::app::AppState;
use axum::Router;

pub mod call;
#[cfg(test)]
mod tests;
pub mod users;
pub mod webhook;
pub mod ws;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(call::router())
        .merge(users::router())
        .merge(webhook::router())
        .merge(ws::router())
}
