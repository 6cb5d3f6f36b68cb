use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::gateway::{STATUS_HEADER, STATUS_REGISTERED};
use crate::service::CompanyProfile;
use crate::store::{CompanyView, Recommendation};

pub const REGISTERED_MESSAGE: &str = "Company registered successfully!";

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub company: CompanyView,
    pub recommendations: Vec<Recommendation>,
}

/// Parses the raw body into a [`CompanyProfile`].
///
/// Anything other than a JSON object is rejected, as are known fields of the
/// wrong type (e.g. a numeric `companyName`).
pub(crate) fn parse_profile(body: serde_json::Value) -> Result<CompanyProfile, GatewayError> {
    if !body.is_object() {
        return Err(GatewayError::InvalidRequest(
            "request body must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

#[instrument(skip(state, body), fields(company = tracing::field::Empty))]
pub async fn register_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let profile = parse_profile(body)?;
    if let Some(name) = &profile.company_name {
        tracing::Span::current().record("company", tracing::field::display(name));
    }

    let registration = state.service.register_company(profile).await?;

    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(STATUS_REGISTERED));

    Ok((
        StatusCode::CREATED,
        headers,
        Json(RegisterResponse {
            message: REGISTERED_MESSAGE,
            company: registration.company,
            recommendations: registration.recommendations,
        }),
    )
        .into_response())
}

#[instrument(skip(state, body))]
pub async fn recommend_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Vec<Recommendation>>, GatewayError> {
    let profile = parse_profile(body)?;
    let recommendations = state.service.query_recommendations(profile).await?;
    debug!(count = recommendations.len(), "Recommendations computed");

    Ok(Json(recommendations))
}
