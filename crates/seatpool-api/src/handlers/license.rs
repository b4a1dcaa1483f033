//! License pool handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use seatpool_license::{AcquireOutcome, HeartbeatOutcome, PoolStatus, ReleaseOutcome};
use seatpool_worker::SweepOutcome;

use crate::dto::request::{LoginRequest, SessionRequest};
use crate::dto::response::{ApiResponse, SessionResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/license/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let Json(req) = payload?;

    match state.pool.acquire(req.owner_id()?).await? {
        AcquireOutcome::Granted(session) => Ok(Json(ApiResponse::ok(session.into()))),
        AcquireOutcome::Rejected { capacity, active } => {
            Err(ApiError::LicenseLimitReached { capacity, active })
        }
    }
}

/// POST /api/license/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let Json(req) = payload?;
    let session_id = req.session_id()?;

    match state.pool.heartbeat(&session_id).await? {
        HeartbeatOutcome::Refreshed(session) => Ok(Json(ApiResponse::ok(session.into()))),
        HeartbeatOutcome::NotFound => Err(ApiError::SessionNotFound(session_id)),
    }
}

/// POST /api/license/logout
pub async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let Json(req) = payload?;
    let session_id = req.session_id()?;

    match state.pool.release(&session_id).await? {
        ReleaseOutcome::Released(session) => Ok(Json(ApiResponse::ok(session.into()))),
        ReleaseOutcome::NotFound => Err(ApiError::SessionNotFound(session_id)),
    }
}

/// GET /api/license/pool
pub async fn pool_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PoolStatus>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.pool.status().await?)))
}

/// POST /api/license/sweep
pub async fn sweep(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SweepOutcome>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.sweeper.sweep_once().await?)))
}
