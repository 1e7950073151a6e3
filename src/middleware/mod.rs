pub mod api_key;
pub mod auth;
pub mod auth_middleware;

pub use api_key::ApiKeyCompany;
pub use auth::AuthenticatedUser;
pub use auth_middleware::auth_middleware;
