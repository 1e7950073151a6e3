pub mod auth;
pub mod chat;
pub mod companies;
pub mod dashboard;
pub mod emails;
pub mod integrations;
pub mod leads;
pub mod public;
pub mod templates;
pub mod users;

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::app::AppState;

// Routes below are grouped by auth requirement; the bearer-token
// middleware is applied over the protected group during assembly.

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route("/{id}/role", patch(users::update_role))
        .route("/me/password", put(users::change_password))
}

pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(leads::list_leads).post(leads::create_lead))
        .route("/{id}", patch(leads::update_lead))
}

pub fn email_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(emails::list_emails))
        .route("/receive", post(emails::receive))
        .route("/{id}/reply", post(emails::generate_reply))
        .route("/{id}/replies", get(emails::list_replies))
        .route("/{id}/analysis", get(emails::analyze))
}

pub fn template_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
}

pub fn integration_routes() -> Router<AppState> {
    Router::new()
        .route("/email/connect", post(integrations::connect))
        .route("/email/status", get(integrations::status))
}

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(companies::get_company).put(companies::update_company),
        )
        .route("/me/rotate-key", post(companies::rotate_api_key))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard::stats))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/lead", post(public::submit_lead))
}

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/message", post(chat::message))
        .route("/lead", post(chat::lead))
}
