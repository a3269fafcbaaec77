//! CLI command handlers.

pub mod auth;
pub mod browse;
pub mod config;
pub mod movies;

use movierama_core::api::ApiError;

/// Formats an API failure, pointing at `movierama login` when the API
/// rejected the stored token.
fn describe(err: &ApiError) -> String {
    if err.is_unauthorized() {
        format!("{err} (session missing or expired, run `movierama login`)")
    } else {
        err.to_string()
    }
}
