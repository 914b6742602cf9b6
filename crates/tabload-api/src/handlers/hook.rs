//! Push-notification endpoint.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse};

use crate::error::{display_message, log_error};
use crate::services::handle_notification;
use crate::state::AppState;

/// POST /hook - 200 "OK" once the object is loaded, 400 with the failure description otherwise.
///
/// Redelivery of the same notification reloads the same table.
pub async fn hook(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    match handle_notification(&state, &body).await {
        Ok(_) => (StatusCode::OK, "OK".to_string()),
        Err(err) => {
            log_error(&err);
            (
                StatusCode::BAD_REQUEST,
                display_message(&err, state.config.is_production()),
            )
        }
    }
}
