//! HTTP handlers for the staff pages.
//!
//! Each handler binds the submitted form, delegates to the service layer and
//! either redirects (`303 See Other`) or renders a [`PageResponse`]. Invalid
//! submissions re-render the page with `422 Unprocessable Entity`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use tracing::{error, warn};

use super::dto::{HealthResponse, LoginQuery, PageResponse};
use super::error::AppError;
use super::extract::{CurrentStaff, SessionHandle, Submission};
use super::state::AppState;
use crate::api::{
    ArtworkId, DashboardData, GeofenceCheckData, LandingData, LoginPageData, RegisterPageData,
    TranslationPageData, UploadPageData,
};
use crate::auth::FlashMessage;
use crate::forms::{
    ArtworkTranslationForm, ArtworkUploadForm, Form, FormErrors, MuseumRegistrationForm,
    StaffLoginForm, StaffRegistrationForm,
};
use crate::routes::artworks::{translations_url, TRANSLATIONS_TEMPLATE, UPLOAD_TEMPLATE};
use crate::routes::auth::{
    safe_next, LOGIN_TEMPLATE, MSG_FORM_ERRORS, MSG_INVALID_LOGIN, MSG_LOGGED_OUT,
    MSG_LOGIN_REJECTED, REGISTER_TEMPLATE,
};
use crate::routes::dashboard::{DASHBOARD_PATH, DASHBOARD_TEMPLATE};
use crate::routes::landing::{INDEX_PATH, INDEX_TEMPLATE};
use crate::services::{self, artworks, ServiceError};

/// Result type for page handlers.
pub type PageResult<T> = Result<PageResponse<T>, AppError>;

fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Reports whether the service is running and the repository is reachable.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    })
}

// =============================================================================
// Landing
// =============================================================================

/// GET /
pub async fn index(
    State(state): State<AppState>,
    mut session: SessionHandle,
) -> PageResult<LandingData> {
    let mut data = LandingData::anonymous();
    if let Some(staff_id) = session.staff_id() {
        match state.repository.get_staff(staff_id).await {
            Ok(staff) if staff.is_active => {
                let museum = state.repository.get_museum(staff.museum_id).await?;
                data = LandingData {
                    authenticated: true,
                    username: Some(staff.username),
                    museum_name: Some(museum.name),
                };
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(PageResponse::render(&mut session, INDEX_TEMPLATE, data))
}

// =============================================================================
// Registration, login and logout
// =============================================================================

/// GET /auth/register/
pub async fn register_page(mut session: SessionHandle) -> PageResponse<RegisterPageData> {
    let context = RegisterPageData {
        museum_form: MuseumRegistrationForm::unbound(),
        staff_form: StaffRegistrationForm::unbound(),
    };
    PageResponse::render(&mut session, REGISTER_TEMPLATE, context)
}

/// POST /auth/register/
///
/// Creates the museum and its admin account, then logs the new admin in.
pub async fn register(
    State(state): State<AppState>,
    mut session: SessionHandle,
    Submission(data): Submission,
) -> Result<Response, AppError> {
    let museum = MuseumRegistrationForm::clean(&data);
    let staff = StaffRegistrationForm::clean(&data);

    let (museum_errors, staff_errors, status) = match (museum, staff) {
        (Ok(museum), Ok(staff)) => {
            match services::register_museum(state.repository.as_ref(), &state.media, museum, staff)
                .await
            {
                Ok((_, staff)) => {
                    session.login(staff.id);
                    session.flash(FlashMessage::success(format!(
                        "Welcome to ArtScope, {}!",
                        staff.full_name()
                    )));
                    return Ok(see_other(DASHBOARD_PATH));
                }
                Err(ServiceError::Rejected(errors)) => {
                    session.flash(FlashMessage::error(MSG_FORM_ERRORS));
                    (FormErrors::new(), errors, StatusCode::UNPROCESSABLE_ENTITY)
                }
                Err(e) => {
                    error!("Registration failed: {}", e);
                    session.flash(FlashMessage::error(format!("Registration failed: {}", e)));
                    (FormErrors::new(), FormErrors::new(), StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
        (museum, staff) => {
            session.flash(FlashMessage::error(MSG_FORM_ERRORS));
            (
                museum.err().unwrap_or_default(),
                staff.err().unwrap_or_default(),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
    };

    let context = RegisterPageData {
        museum_form: MuseumRegistrationForm::bound(&data, museum_errors),
        staff_form: StaffRegistrationForm::bound(&data, staff_errors),
    };
    Ok(PageResponse::render(&mut session, REGISTER_TEMPLATE, context).with_status(status))
}

/// GET /auth/login/
pub async fn login_page(
    mut session: SessionHandle,
    Query(query): Query<LoginQuery>,
) -> PageResponse<LoginPageData> {
    let context = LoginPageData {
        form: StaffLoginForm::unbound(),
        next: safe_next(query.next.as_deref()).map(str::to_string),
    };
    PageResponse::render(&mut session, LOGIN_TEMPLATE, context)
}

/// POST /auth/login/
///
/// On success redirects to the `next` query parameter, or the dashboard.
pub async fn login(
    State(state): State<AppState>,
    mut session: SessionHandle,
    Query(query): Query<LoginQuery>,
    Submission(data): Submission,
) -> Result<Response, AppError> {
    let next = safe_next(query.next.as_deref()).map(str::to_string);

    let errors = match StaffLoginForm::clean(&data) {
        Ok(credentials) => match services::login(state.repository.as_ref(), &credentials).await? {
            Some(staff) => {
                session.login(staff.id);
                session.flash(FlashMessage::success(format!(
                    "Welcome back, {}!",
                    staff.full_name()
                )));
                return Ok(see_other(next.as_deref().unwrap_or(DASHBOARD_PATH)));
            }
            None => {
                warn!("Failed login attempt for '{}'", credentials.username);
                let mut errors = FormErrors::new();
                errors.add_non_field(MSG_LOGIN_REJECTED);
                errors
            }
        },
        Err(errors) => errors,
    };

    session.flash(FlashMessage::error(MSG_INVALID_LOGIN));
    let context = LoginPageData {
        form: StaffLoginForm::bound(&data, errors),
        next,
    };
    Ok(PageResponse::render(&mut session, LOGIN_TEMPLATE, context)
        .with_status(StatusCode::UNPROCESSABLE_ENTITY))
}

/// GET|POST /auth/logout/
pub async fn logout(mut session: SessionHandle) -> Response {
    session.logout();
    session.flash(FlashMessage::info(MSG_LOGGED_OUT));
    see_other(INDEX_PATH)
}

// =============================================================================
// Staff pages
// =============================================================================

/// GET /dashboard/
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentStaff { staff, mut session }: CurrentStaff,
) -> PageResult<DashboardData> {
    let data = services::dashboard_data(state.repository.as_ref(), &state.media, &staff).await?;
    Ok(PageResponse::render(&mut session, DASHBOARD_TEMPLATE, data))
}

/// GET /artworks/upload/
pub async fn upload_page(
    State(state): State<AppState>,
    CurrentStaff { mut session, .. }: CurrentStaff,
) -> PageResult<UploadPageData> {
    let context = UploadPageData {
        form: ArtworkUploadForm::unbound(),
        artists: artworks::artist_names(state.repository.as_ref()).await?,
    };
    Ok(PageResponse::render(&mut session, UPLOAD_TEMPLATE, context))
}

/// POST /artworks/upload/
///
/// Stores the artwork with its QR code and returns to the dashboard.
pub async fn upload(
    State(state): State<AppState>,
    CurrentStaff { staff, mut session }: CurrentStaff,
    Submission(data): Submission,
) -> Result<Response, AppError> {
    let errors = match ArtworkUploadForm::clean(&data) {
        Ok(upload) => {
            match services::upload_artwork(state.repository.as_ref(), &state.media, &staff, upload)
                .await
            {
                Ok(artwork) => {
                    session.flash(FlashMessage::success(format!(
                        "Artwork \"{}\" uploaded successfully.",
                        artwork.title
                    )));
                    return Ok(see_other(DASHBOARD_PATH));
                }
                Err(ServiceError::Rejected(errors)) => errors,
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => errors,
    };

    session.flash(FlashMessage::error(MSG_FORM_ERRORS));
    let context = UploadPageData {
        form: ArtworkUploadForm::bound(&data, errors),
        artists: artworks::artist_names(state.repository.as_ref()).await?,
    };
    Ok(PageResponse::render(&mut session, UPLOAD_TEMPLATE, context)
        .with_status(StatusCode::UNPROCESSABLE_ENTITY))
}

fn parse_artwork_id(raw: &str) -> Result<ArtworkId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Artwork {} not found", raw)))
}

/// GET /artworks/{artwork_id}/translations/
pub async fn translations_page(
    State(state): State<AppState>,
    CurrentStaff { staff, mut session }: CurrentStaff,
    Path(artwork_id): Path<String>,
) -> PageResult<TranslationPageData> {
    let artwork_id = parse_artwork_id(&artwork_id)?;
    let artwork = services::museum_artwork(state.repository.as_ref(), &staff, artwork_id).await?;
    let context = artworks::translation_page(
        state.repository.as_ref(),
        &state.media,
        &artwork,
        ArtworkTranslationForm::unbound(),
    )
    .await?;
    Ok(PageResponse::render(&mut session, TRANSLATIONS_TEMPLATE, context))
}

/// POST /artworks/{artwork_id}/translations/
pub async fn add_translation(
    State(state): State<AppState>,
    CurrentStaff { staff, mut session }: CurrentStaff,
    Path(artwork_id): Path<String>,
    Submission(data): Submission,
) -> Result<Response, AppError> {
    let artwork_id = parse_artwork_id(&artwork_id)?;
    let repo = state.repository.as_ref();
    let artwork = services::museum_artwork(repo, &staff, artwork_id).await?;

    let errors = match ArtworkTranslationForm::clean(&data) {
        Ok(submission) => {
            match services::add_translation(repo, &state.media, &artwork, submission).await {
                Ok(translation) => {
                    session.flash(FlashMessage::success(format!(
                        "{} translation added.",
                        translation.language.label()
                    )));
                    return Ok(see_other(&translations_url(artwork.id)));
                }
                Err(ServiceError::Rejected(errors)) => errors,
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => errors,
    };

    session.flash(FlashMessage::error(MSG_FORM_ERRORS));
    let form = ArtworkTranslationForm::bound(&data, errors);
    let context = artworks::translation_page(repo, &state.media, &artwork, form).await?;
    Ok(PageResponse::render(&mut session, TRANSLATIONS_TEMPLATE, context)
        .with_status(StatusCode::UNPROCESSABLE_ENTITY))
}

/// POST /artworks/{artwork_id}/geofence-check/
///
/// Checks a position (`latitude`, `longitude`) against the artwork's
/// geofence.
pub async fn geofence_check(
    State(state): State<AppState>,
    CurrentStaff { staff, .. }: CurrentStaff,
    Path(artwork_id): Path<String>,
    Submission(data): Submission,
) -> Result<Json<GeofenceCheckData>, AppError> {
    let artwork_id = parse_artwork_id(&artwork_id)?;
    let artwork = services::museum_artwork(state.repository.as_ref(), &staff, artwork_id).await?;
    let data = services::check_artwork_geofence(&artwork, &data).map_err(AppError::Validation)?;
    Ok(Json(data))
}
