pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::auth::handlers as auth_handlers;
use crate::oauth::handlers as oauth_handlers;
use crate::portfolio::handlers as portfolio_handlers;
use crate::resume::handlers as resume_handlers;
use crate::state::AppState;
use crate::talent::handlers as talent_handlers;

/// Multipart bodies carry up to a 5 MiB image plus text fields. The real
/// cap is enforced in `upload::save_image`; this limit only has to clear it.
const BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route(
            "/auth/signup/student",
            post(auth_handlers::handle_signup_student),
        )
        .route(
            "/auth/signup/company",
            post(auth_handlers::handle_signup_company),
        )
        .route("/auth/login", post(auth_handlers::handle_login))
        .route("/auth/me", get(auth_handlers::handle_me))
        .route("/auth/logout", post(auth_handlers::handle_logout))
        // Social login
        .route(
            "/auth/login/:provider",
            get(oauth_handlers::handle_oauth_login),
        )
        .route(
            "/auth/callback/:provider",
            get(oauth_handlers::handle_oauth_callback),
        )
        // Resumes
        .route(
            "/resumes/basic-info",
            post(resume_handlers::handle_create_basic_info),
        )
        .route(
            "/resumes/:resume_id/detail",
            get(resume_handlers::handle_resume_detail),
        )
        .route("/awards", post(resume_handlers::handle_create_award))
        .route(
            "/educations",
            post(resume_handlers::handle_create_education),
        )
        // Portfolios
        .route(
            "/portfolios",
            post(portfolio_handlers::handle_create_portfolio)
                .get(portfolio_handlers::handle_list_portfolios),
        )
        .route(
            "/portfolios/:id",
            put(portfolio_handlers::handle_update_portfolio)
                .delete(portfolio_handlers::handle_delete_portfolio),
        )
        .route(
            "/portfolios/:id/representative",
            patch(portfolio_handlers::handle_set_representative),
        )
        // Projects
        .route(
            "/projects",
            post(portfolio_handlers::handle_create_project)
                .get(portfolio_handlers::handle_list_projects),
        )
        .route(
            "/projects/:id",
            put(portfolio_handlers::handle_update_project)
                .delete(portfolio_handlers::handle_delete_project),
        )
        // Talent discovery
        .route("/talents", get(talent_handlers::handle_search_talents))
        .route(
            "/talents/connect-request",
            post(talent_handlers::handle_create_connect_request),
        )
        // Uploaded images
        .nest_service("/media", ServeDir::new(&state.config.media_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}
