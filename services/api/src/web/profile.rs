//! services/api/src/web/profile.rs
//!
//! Handlers for the user profile singleton.

use crate::error::{to_http, HandlerError};
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use lumina_core::domain::{Preferences, UserProfile};
use lumina_core::profile::{OnboardingForm, ProfileEdit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: UserProfile,
    /// True until a profile has been saved; clients show onboarding.
    pub first_run: bool,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalsRequest {
    pub yearly_goal: Option<u32>,
    pub daily_page_goal: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    /// An embedded image, `data:image/...`.
    pub data_uri: String,
}

fn respond(profile: &UserProfile) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        profile: profile.clone(),
        first_run: false,
    })
}

#[utoipa::path(
    get,
    path = "/profile",
    responses((status = 200, body = ProfileResponse))
)]
pub async fn get_profile_handler(State(app_state): State<Arc<AppState>>) -> Json<ProfileResponse> {
    let library = app_state.library.lock().await;
    let store = library.profile();
    Json(ProfileResponse {
        profile: store.profile().clone(),
        first_run: store.is_first_run(),
    })
}

/// Update name, title and bio. The initials avatar follows the name.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = ProfileEdit,
    responses(
        (status = 200, body = ProfileResponse),
        (status = 400, description = "Empty name")
    )
)]
pub async fn edit_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Json(edit): Json<ProfileEdit>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let mut library = app_state.library.lock().await;
    let profile = library.profile_mut().edit(edit).await.map_err(to_http)?;
    Ok(respond(profile))
}

#[utoipa::path(
    post,
    path = "/profile/onboarding",
    request_body = OnboardingForm,
    responses(
        (status = 200, body = ProfileResponse),
        (status = 400, description = "Empty name")
    )
)]
pub async fn onboarding_handler(
    State(app_state): State<Arc<AppState>>,
    Json(form): Json<OnboardingForm>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let mut library = app_state.library.lock().await;
    let profile = library
        .profile_mut()
        .complete_onboarding(form)
        .await
        .map_err(to_http)?;
    Ok(respond(profile))
}

/// Set either goal or both. Goals must be positive; a rejected pair changes neither.
#[utoipa::path(
    put,
    path = "/profile/goals",
    request_body = GoalsRequest,
    responses(
        (status = 200, body = ProfileResponse),
        (status = 400, description = "A goal of zero")
    )
)]
pub async fn goals_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<GoalsRequest>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let mut library = app_state.library.lock().await;
    let profile = library
        .profile_mut()
        .set_goals(request.yearly_goal, request.daily_page_goal)
        .await
        .map_err(to_http)?;
    Ok(respond(profile))
}

#[utoipa::path(
    put,
    path = "/profile/preferences",
    request_body = Preferences,
    responses((status = 200, body = ProfileResponse))
)]
pub async fn preferences_handler(
    State(app_state): State<Arc<AppState>>,
    Json(preferences): Json<Preferences>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let mut library = app_state.library.lock().await;
    let profile = library
        .profile_mut()
        .set_preferences(preferences)
        .await
        .map_err(to_http)?;
    Ok(respond(profile))
}

#[utoipa::path(
    put,
    path = "/profile/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, body = ProfileResponse),
        (status = 400, description = "Not an embedded image")
    )
)]
pub async fn avatar_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<AvatarRequest>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let mut library = app_state.library.lock().await;
    let profile = library
        .profile_mut()
        .set_avatar_image(&request.data_uri)
        .await
        .map_err(to_http)?;
    Ok(respond(profile))
}

/// Wipe reading progress and reset the yearly goal, keeping the books.
#[utoipa::path(
    post,
    path = "/profile/restart",
    responses((status = 204, description = "Progress cleared"))
)]
pub async fn restart_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    let mut library = app_state.library.lock().await;
    library.restart_profile().await.map_err(to_http)?;
    Ok(StatusCode::NO_CONTENT)
}
