use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::otp::ports::RecoveryServicePort;
use crate::inbound::http::router::AppState;

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequestBody>,
) -> Result<ApiSuccess<VerifyOtpResponseData>, ApiError> {
    let reset_token = state
        .recovery_service
        .verify_otp(&body.email, &body.code)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        VerifyOtpResponseData {
            message: "Code verified".to_string(),
            reset_token,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyOtpRequestBody {
    email: String,
    code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyOtpResponseData {
    pub message: String,
    pub reset_token: String,
}
