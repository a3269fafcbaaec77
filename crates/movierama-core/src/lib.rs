//! Core MovieRama client library (config, session, API clients, controllers).

pub mod api;
pub mod config;
pub mod controllers;
pub mod model;
pub mod request_id;
pub mod routes;
pub mod session;
