//! Guards for routes that need a logged in user.
//!
//! A request passes the guard when its auth cookie decrypts to a token for a
//! user that is still registered. The user's ID is then available to handlers
//! through `Extension<UserID>`, and the cookie's expiry is pushed back on the
//! way out.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::{Duration, UtcOffset};

use crate::{
    AppState, Error,
    auth::{
        UserID, build_log_in_redirect_url,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        get_user_by_id,
        redirect::build_log_in_redirect_url_from_target,
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth guards.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
    /// Used to check that the user behind a cookie still exists.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Where to send a rejected request: the log in page, with a link back to
/// the page the user was on.
fn log_in_redirect_target(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to dashboard."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to dashboard.");
        }

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

/// Check that `user_id` belongs to a registered user.
///
/// The lock is released before returning so it is never held across the
/// rest of the request.
fn is_registered(user_id: UserID, db_connection: &Mutex<Connection>) -> bool {
    let connection = match db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return false;
        }
    };

    match get_user_by_id(user_id, &connection) {
        Ok(_) => true,
        Err(Error::NotFound) => {
            tracing::info!("Rejected auth cookie for user {user_id} who no longer exists.");
            false
        }
        Err(error) => {
            tracing::error!("Could not look up user {user_id}: {error}");
            false
        }
    }
}

/// The user ID from a valid auth cookie for a registered user.
fn authenticate(jar: &PrivateCookieJar, state: &AuthState) -> Option<UserID> {
    let user_id = match get_token_from_cookies(jar) {
        Ok(token) => token.user_id,
        Err(error) => {
            tracing::debug!("Rejected auth cookie: {error}.");
            return None;
        }
    };

    is_registered(user_id, &state.db_connection).then_some(user_id)
}

/// Copy a refreshed auth cookie onto `response`.
fn with_refreshed_cookie(
    response: Response,
    jar: PrivateCookieJar,
    cookie_duration: Duration,
    local_offset: UtcOffset,
) -> Response {
    let refreshed =
        extend_auth_cookie_duration_if_needed(jar.clone(), cookie_duration, local_offset);
    let jar = match refreshed {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error:?}. Keeping the old cookie.");
            jar
        }
    };

    let (mut parts, body) = response.into_parts();
    for (key, value) in jar.into_response().headers() {
        if key == SET_COOKIE {
            parts.headers.append(key, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    reject: impl Fn(&str) -> Response,
) -> Response {
    let log_in_url = log_in_redirect_target(&request);

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}. Redirecting to log in page.", state.local_timezone);
        return reject(&log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return reject(&log_in_url);
        }
    };

    let Some(user_id) = authenticate(&jar, &state) else {
        return reject(&log_in_url);
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    with_refreshed_cookie(response, jar, state.cookie_duration, local_offset)
}

/// Let requests with a valid auth cookie through, otherwise redirect to the
/// log in page.
///
/// Handlers behind this guard receive the user's ID with
/// `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, |log_in_url| {
        Redirect::to(log_in_url).into_response()
    })
    .await
}

/// The same as [auth_guard], but redirects with the `HX-Redirect` header so
/// that htmx requests navigate the whole page to the log in page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, |log_in_url| {
        (HxRedirect(log_in_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
