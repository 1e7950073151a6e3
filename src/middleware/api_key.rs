// Tenant resolution for public-facing endpoints via the X-API-Key header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app::AppState;
use crate::models::Company;
use crate::utils::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor resolving the company that owns the presented API key.
/// A missing or unknown key rejects with 401.
#[derive(Debug, Clone)]
pub struct ApiKeyCompany(pub Company);

impl FromRequestParts<AppState> for ApiKeyCompany {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing X-API-Key header".to_string()))?;

        let mut conn = state
            .diesel_pool
            .get()
            .await
            .map_err(ApiError::internal)?;

        match Company::find_by_api_key(&mut conn, key).await {
            Ok(company) => Ok(ApiKeyCompany(company)),
            Err(diesel::result::Error::NotFound) => {
                Err(ApiError::Unauthorized("Invalid API key".to_string()))
            },
            Err(e) => Err(ApiError::internal(e)),
        }
    }
}
