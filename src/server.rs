use crate::{
    auth, config::BootstrapUser, handlers, services::user_service::CreateUserRequest,
    services::UserServiceError, AppState,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Builds the full application: public routes plus the bearer-protected `/users` group.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/users",
            get(handlers::list_users_handler).post(handlers::create_user_handler),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user_handler)
                .put(handlers::update_user_handler)
                .delete(handlers::delete_user_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/auth", post(auth::auth_handler))
        .route("/", get(handlers::version_handler))
        .route("/version", get(handlers::version_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Ensures the configured bootstrap account exists. An existing login is fine.
pub async fn seed_bootstrap_user(
    state: &AppState,
    bootstrap: &BootstrapUser,
) -> Result<(), UserServiceError> {
    let request = CreateUserRequest {
        login: bootstrap.login.clone(),
        password: bootstrap.password.clone(),
        email: None,
    };

    match state.user_service.create_user(request).await {
        Ok(user) => {
            info!(user_id = user.id, login = %user.login, "bootstrap user created");
            Ok(())
        }
        Err(UserServiceError::LoginTaken) => {
            info!(login = %bootstrap.login, "bootstrap user already present");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Serves until SIGINT/SIGTERM, then lets in-flight requests finish.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
