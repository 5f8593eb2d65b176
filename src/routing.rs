//! Application router configuration with protected and unprotected route definitions.

use std::path::Path;

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{
    AppState, Error,
    analysis::analyze_expenses_endpoint,
    auth::{auth_guard, get_check_auth, post_log_in, post_log_out},
    balance::{add_funds_endpoint, clear_balance_endpoint, get_balance_endpoint},
    endpoints,
    expense::{
        add_expense_endpoint, edit_expense_endpoint, get_expenses_endpoint,
        remove_expense_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Unknown paths get a JSON `404 Not Found` response.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::CHECK_AUTH, get(get_check_auth));

    let protected_routes = Router::new()
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::GET_EXPENSES, get(get_expenses_endpoint))
        .route(endpoints::ADD_EXPENSE, post(add_expense_endpoint))
        .route(endpoints::EDIT_EXPENSE, post(edit_expense_endpoint))
        .route(endpoints::REMOVE_EXPENSE, post(remove_expense_endpoint))
        .route(endpoints::GET_BALANCE, get(get_balance_endpoint))
        .route(endpoints::ADD_FUNDS, post(add_funds_endpoint))
        .route(endpoints::CLEAR_BALANCE, post(clear_balance_endpoint))
        .route(endpoints::ANALYZE_EXPENSES, get(analyze_expenses_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Serve the files in `static_dir`, e.g. the client app, for any path that is
/// not an API route.
///
/// Paths that match neither a route nor a file still get a JSON `404 Not Found`.
pub fn serve_static_files(router: Router, static_dir: &Path) -> Router {
    let serve_dir =
        ServeDir::new(static_dir).not_found_service(get_404_not_found.into_service());

    router.fallback_service(serve_dir)
}

/// Allow a client app served from `allowed_origin` to call the API with its
/// session cookie.
pub fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
