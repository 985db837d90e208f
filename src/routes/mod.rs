pub mod assets;
pub mod auth_pages;
pub mod home;
pub mod posts;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::gate;
use crate::state::AppState;

/// The full application router, gate middleware included. Shared between
/// `main` and the integration tests so both exercise the same stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(auth_pages::router())
        .merge(posts::router())
        .merge(gate::handlers::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::require_company_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
