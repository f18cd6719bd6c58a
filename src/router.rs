use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Router の構築
///
/// 全ルートは /api/v1 配下にマウントする。
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health_check))
        // 認証
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        // パスワード
        .route("/password/forgot", post(handlers::forgot_password))
        .route("/password/reset", post(handlers::reset_password))
        .route("/password/change", post(handlers::change_password))
        // メール確認
        .route("/email/verify", post(handlers::verify_email))
        .route(
            "/email/verify/request",
            post(handlers::request_email_verification),
        )
        // アカウント
        .route("/user/delete", delete(handlers::delete_account));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
