//! Client-side routes.
//!
//! Mirrors the screens of the client: the site-wide feed, a user's movies,
//! the auth forms and the add-movie form.

use std::fmt;
use std::str::FromStr;

use crate::model::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    UserMovies(UserId),
    Login,
    Register,
    AddMovie,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::UserMovies(user_id) => format!("/users/{user_id}/movies"),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::AddMovie => "/movies/add".to_string(),
        }
    }
}

/// Parses the `user_id` route parameter.
///
/// # Errors
/// Returns an error if the parameter is not a non-negative integer.
pub fn parse_user_id_param(param: &str) -> Result<UserId, String> {
    param
        .trim()
        .parse::<UserId>()
        .map_err(|err| format!("Invalid user id '{param}': {err}"))
}

impl FromStr for Route {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = value
            .trim()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Ok(Route::Home),
            ["login"] => Ok(Route::Login),
            ["register"] => Ok(Route::Register),
            ["movies", "add"] => Ok(Route::AddMovie),
            ["users", user_id, "movies"] => parse_user_id_param(user_id).map(Route::UserMovies),
            _ => Err(format!("Unknown route: {value}")),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
