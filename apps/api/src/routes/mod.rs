pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Router,
};

use crate::portfolios::handlers as portfolios;
use crate::profiles::handlers as profiles;
use crate::resumes::handlers as resumes;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    let resume_collection = get(resumes::handle_list_resumes).post(resumes::handle_upload_resume);
    let portfolio_collection =
        get(portfolios::handle_list_portfolios).post(portfolios::handle_create_portfolio);
    let user_record = get(users::handle_get_user).patch(users::handle_update_user);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Resumes
        .route("/resumes", resume_collection.clone())
        .route("/resumes/", resume_collection)
        .route(
            "/resumes/:id",
            get(resumes::handle_get_resume).delete(resumes::handle_delete_resume),
        )
        .route(
            "/resumes/:id/download",
            get(resumes::handle_download_resume),
        )
        // Profiles
        .route(
            "/profiles/me",
            get(profiles::handle_get_profile)
                .post(profiles::handle_create_profile)
                .put(profiles::handle_update_profile)
                .delete(profiles::handle_delete_profile),
        )
        // Portfolios
        .route("/portfolios", portfolio_collection.clone())
        .route("/portfolios/", portfolio_collection)
        .route(
            "/portfolios/:id",
            get(portfolios::handle_get_portfolio)
                .put(portfolios::handle_update_portfolio)
                .delete(portfolios::handle_delete_portfolio),
        )
        .route(
            "/portfolios/:id/publish",
            patch(portfolios::handle_toggle_publish),
        )
        // Users
        .route("/users", user_record.clone())
        .route("/users/", user_record)
        .route(
            "/users/pfp",
            get(users::handle_get_profile_picture).post(users::handle_upload_profile_picture),
        )
        .layer(body_limit)
        .with_state(state)
}
