//! Request extractors: the session, the logged-in staff member and submitted
//! form data.

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, Multipart, Request},
    http::{header::CONTENT_TYPE, request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, RequestExt,
};
use tower_cookies::cookie::{time::Duration as CookieDuration, SameSite};
use tower_cookies::{Cookie, Cookies};

use super::error::AppError;
use super::state::AppState;
use crate::api::StaffId;
use crate::auth::{FlashMessage, SessionStore};
use crate::forms::{FormData, UploadedFile};
use crate::models::MuseumStaff;
use crate::routes::auth::login_url_with_next;

/// The visitor's server-side session.
///
/// A session is only created when something is written to it (a flash
/// message or a login), so anonymous page views do not set a cookie.
pub struct SessionHandle {
    store: SessionStore,
    cookies: Cookies,
    cookie_name: String,
    cookie_secure: bool,
    key: Option<String>,
    staff_id: Option<StaffId>,
}

impl SessionHandle {
    pub fn staff_id(&self) -> Option<StaffId> {
        self.staff_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.staff_id.is_some()
    }

    /// Queue a message for the next rendered page.
    pub fn flash(&mut self, message: FlashMessage) {
        let key = match &self.key {
            Some(key) => key.clone(),
            None => {
                let session = self.store.load_or_create(None);
                self.set_cookie(&session.key);
                self.key = Some(session.key.clone());
                session.key
            }
        };
        self.store.push_message(&key, message);
    }

    /// Remove and return the queued messages.
    pub fn take_messages(&mut self) -> Vec<FlashMessage> {
        match &self.key {
            Some(key) => self.store.take_messages(key),
            None => Vec::new(),
        }
    }

    /// Log a staff member in under a fresh session key.
    pub fn login(&mut self, staff_id: StaffId) {
        let session = self.store.login(self.key.as_deref(), staff_id);
        self.set_cookie(&session.key);
        self.key = Some(session.key);
        self.staff_id = Some(staff_id);
    }

    /// Forget the current session and start an empty one.
    pub fn logout(&mut self) {
        let session = self.store.flush(self.key.as_deref());
        self.set_cookie(&session.key);
        self.key = Some(session.key);
        self.staff_id = None;
    }

    fn set_cookie(&self, key: &str) {
        let cookie = Cookie::build((self.cookie_name.clone(), key.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(CookieDuration::seconds(self.store.ttl_secs()))
            .build();
        self.cookies.add(cookie);
    }
}

impl<S> FromRequestParts<S> for SessionHandle
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let cookies = Cookies::from_request_parts(parts, state).await?;
        let cookie_name = app.config.session.cookie_name.clone();

        let session = cookies
            .get(&cookie_name)
            .and_then(|c| app.sessions.get(c.value()));

        Ok(SessionHandle {
            store: app.sessions.clone(),
            cookies,
            cookie_name,
            cookie_secure: app.config.session.cookie_secure,
            key: session.as_ref().map(|s| s.key.clone()),
            staff_id: session.and_then(|s| s.staff_id),
        })
    }
}

/// The logged-in staff member. Anonymous requests are redirected to the
/// login page with a `next` parameter pointing back at the request path.
pub struct CurrentStaff {
    pub staff: MuseumStaff,
    pub session: SessionHandle,
}

impl<S> FromRequestParts<S> for CurrentStaff
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let session = SessionHandle::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let login_redirect = || {
            let path = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| parts.uri.path());
            Redirect::to(&login_url_with_next(path)).into_response()
        };

        let Some(staff_id) = session.staff_id() else {
            return Err(login_redirect());
        };
        match app.repository.get_staff(staff_id).await {
            Ok(staff) if staff.is_active => Ok(CurrentStaff { staff, session }),
            Ok(_) => Err(login_redirect()),
            Err(e) if e.is_not_found() => Err(login_redirect()),
            Err(e) => Err(AppError::from(e).into_response()),
        }
    }
}

/// Submitted form data, from either a urlencoded or a multipart body.
pub struct Submission(pub FormData);

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = req
                .extract_with_state::<Multipart, _, _>(state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return read_multipart(multipart).await.map(Submission);
        }

        let Form(pairs): Form<Vec<(String, String)>> = Form::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Submission(FormData::from_pairs(pairs)))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormData, AppError> {
    let mut data = FormData::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                let mut file = UploadedFile::new(filename, bytes.to_vec());
                if let Some(content_type) = content_type {
                    file = file.with_content_type(content_type);
                }
                data.insert_file(name, file);
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                data.insert(name, value);
            }
        }
    }
    Ok(data)
}
