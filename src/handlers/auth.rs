// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{CurrentUser, SITE_COOKIE, USER_COOKIE},
    models::{
        auth::{LoginPayload, RegisterPayload},
        site::EXTERNAL_SITE_ID,
    },
};

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value)).path("/").http_only(true).build()
}

pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // O id do site veio de fora: valida contra o diretório antes de abrir
    // qualquer banco.
    if !app_state.site_service.site_exists(&payload.site_id).await? {
        return Err(AppError::InvalidCredentials);
    }

    let user = app_state
        .auth_service
        .login(&payload.site_id, &payload.username, &payload.password)
        .await?;

    let jar = jar
        .add(session_cookie(USER_COOKIE, user.id.to_string()))
        .add(session_cookie(SITE_COOKIE, payload.site_id.clone()));

    Ok((StatusCode::OK, jar, Json(user)))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar
        .remove(Cookie::build((USER_COOKIE, "")).path("/").build())
        .remove(Cookie::build((SITE_COOKIE, "")).path("/").build());
    (StatusCode::OK, jar, Json(json!({ "ok": true })))
}

pub async fn get_me(user: CurrentUser) -> impl IntoResponse {
    let session = user.0;
    Json(json!({
        "user": session.user,
        "siteId": session.site_id,
        "isSuperAdmin": session.is_super_admin,
    }))
}

/// Auto-registro de alunos externos. A conta nasce no site `external` e a
/// sessão já sai autenticada nele.
pub async fn register(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.auth_service.register_external(&payload).await?;

    let jar = jar
        .add(session_cookie(USER_COOKIE, user.id.to_string()))
        .add(session_cookie(SITE_COOKIE, EXTERNAL_SITE_ID.to_string()));

    Ok((StatusCode::CREATED, jar, Json(user)))
}
