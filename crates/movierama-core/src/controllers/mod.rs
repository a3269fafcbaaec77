//! View-models behind each screen.
//!
//! A controller owns the state one screen renders and turns user intents into
//! API calls. Front-ends read the public accessors and never mutate state
//! directly.

mod auth;
mod create_movie;
mod listing;

pub use auth::{LoginController, RegisterController};
pub use create_movie::CreateMovieController;
pub use listing::{ListingController, ListingRequest, ListingState};
