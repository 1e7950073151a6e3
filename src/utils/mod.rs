pub mod api_error;
pub mod password;

pub use api_error::ApiError;
