use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::otp::ports::RecoveryServicePort;
use crate::inbound::http::router::AppState;

pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestOtpRequestBody>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state.recovery_service.request_otp(&body.email).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("If the email is registered, a code has been sent"),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestOtpRequestBody {
    email: String,
}
