use axum::extract::State;
use axum::http::StatusCode;

use crate::SharedState;

pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// Not ready once shutdown has begun, so load balancers stop routing new
/// requests before the listener closes.
pub async fn readyz(State(state): State<SharedState>) -> StatusCode {
    if state.readiness.load(std::sync::atomic::Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
