// src/main.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::{
    config::AppState,
    middleware::session::load_session,
    models::auth::{Role, UserType},
};

/// Garante que o site administrativo tem ao menos um super admin. Roda a
/// cada inicialização e não faz nada se o usuário já existe.
async fn seed_super_admin(app_state: &AppState) -> anyhow::Result<()> {
    let admin_pool = app_state.stores.open(None).await?;
    let username = app_state.seed_admin_username.clone();

    if app_state.user_repo.find_by_username(&admin_pool, &username).await?.is_some() {
        return Ok(());
    }

    let password_hash =
        services::auth_service::AuthService::hash_password(&app_state.seed_admin_password).await?;
    app_state
        .user_repo
        .create(
            &admin_pool,
            &username,
            &password_hash,
            "Administrador",
            None,
            None,
            Role::Admin,
            UserType::Employee,
        )
        .await?;
    tracing::info!(username = %username, "Super admin inicial criado no site administrativo");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Bancos reservados (administrativo + externo) migrados antes de
    // aceitar tráfego; os das filiais migram sob demanda no primeiro open.
    app_state
        .site_service
        .ensure_reserved_stores()
        .await
        .expect("Falha ao preparar os bancos reservados.");
    seed_super_admin(&app_state)
        .await
        .expect("Falha ao semear o super admin inicial.");

    // Rotas sem exigência de sessão: login/registro, diretório de sites (a
    // tela de login precisa dele) e o retorno do gateway de pagamento. Quem
    // barra as demais são os extratores CurrentUser/RequireAdmin/
    // RequireSuperAdmin. A sessão é carregada uma vez, para todas.
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me));

    let site_routes = Router::new()
        .route("/", get(handlers::sites::list_sites).post(handlers::sites::create_site))
        .route("/{site_id}", delete(handlers::sites::delete_site));

    let user_routes = Router::new()
        .route("/", post(handlers::users::create_user).get(handlers::users::list_users))
        .route("/{user_id}", delete(handlers::users::delete_user));

    let course_routes = Router::new()
        .route("/", post(handlers::courses::create_course).get(handlers::courses::list_courses))
        .route(
            "/{course_id}",
            get(handlers::courses::get_course).put(handlers::courses::update_course),
        )
        .route("/{course_id}/modules", post(handlers::courses::create_module))
        .route("/{course_id}/signatories", put(handlers::courses::assign_signatories))
        .route("/{course_id}/retrain", post(handlers::courses::retrain))
        .route("/{course_id}/enroll", post(handlers::courses::enroll))
        .route("/{course_id}/certificates", get(handlers::certificates::course_certificates))
        .route(
            "/{course_id}/pre-test",
            get(handlers::assessments::get_pre_test).post(handlers::assessments::submit_pre_test),
        )
        .route(
            "/{course_id}/final-assessment",
            get(handlers::assessments::get_final_assessment)
                .post(handlers::assessments::submit_final_assessment),
        )
        .route(
            "/{course_id}/lessons/{lesson_id}/quiz",
            post(handlers::assessments::submit_quiz),
        );

    let certificate_routes = Router::new()
        .route("/mine", get(handlers::certificates::my_certificates))
        .route("/recognition", post(handlers::certificates::issue_recognition))
        .route(
            "/{certificate_id}/signatories",
            get(handlers::certificates::certificate_signatories),
        );

    let signatory_routes = Router::new()
        .route(
            "/",
            post(handlers::certificates::create_signatory)
                .get(handlers::certificates::list_signatories),
        )
        .route("/{signatory_id}", delete(handlers::certificates::delete_signatory));

    let payment_routes = Router::new()
        .route("/", get(handlers::payments::list_transactions))
        .route("/checkout", post(handlers::payments::checkout))
        .route("/confirm", get(handlers::payments::confirm))
        .route("/{transaction_id}/decision", post(handlers::payments::decide));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/sites", site_routes)
        .nest("/api/users", user_routes)
        .nest("/api/courses", course_routes)
        .route("/api/lessons", post(handlers::courses::create_lesson))
        .route("/api/my-courses", get(handlers::courses::my_courses))
        .route("/api/progress/complete", post(handlers::progress::complete_lesson))
        .nest("/api/certificates", certificate_routes)
        .nest("/api/signatories", signatory_routes)
        .nest("/api/payments", payment_routes)
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::put_settings),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), load_session))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
