// src/middleware/session.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{common::error::AppError, config::AppState, models::auth::SessionUser};

// Os dois tokens opacos da sessão, em cookies.
pub const USER_COOKIE: &str = "lms_user";
pub const SITE_COOKIE: &str = "lms_site";

/// Resolve a sessão UMA vez por requisição e guarda o resultado imutável
/// nas extensions. Requisição anônima segue adiante sem extension; são os
/// extratores abaixo que barram as rotas que exigem sessão.
pub async fn load_session(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let user_token = jar.get(USER_COOKIE).map(|c| c.value().to_string());
    let site_token = jar.get(SITE_COOKIE).map(|c| c.value().to_string());

    if let Some(session) = app_state
        .session_service
        .resolve(user_token.as_deref(), site_token.as_deref())
        .await
    {
        request.extensions_mut().insert(session);
    }
    next.run(request).await
}

// Extrator para obter a sessão resolvida diretamente nos handlers.
pub struct CurrentUser(pub SessionUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

// Guardião: o handler só roda para admins (do site, ou super admin).
pub struct RequireAdmin(pub SessionUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;
        if !session.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(RequireAdmin(session))
    }
}

// Guardião mais estrito: gestão de filiais é só para super admins.
pub struct RequireSuperAdmin(pub SessionUser);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;
        if !session.is_super_admin {
            return Err(AppError::Forbidden);
        }
        Ok(RequireSuperAdmin(session))
    }
}
