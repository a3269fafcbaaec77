//! Add-movie form.

use crate::api::{ApiError, MovieClient};
use crate::model::NewMovie;
use crate::routes::Route;

#[derive(Debug, Default)]
pub struct CreateMovieController {
    pub form: NewMovie,
    error: Option<ApiError>,
    navigate_to: Option<Route>,
}

impl CreateMovieController {
    pub fn with_form(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            form: NewMovie {
                title: title.into(),
                description: description.into(),
            },
            ..Self::default()
        }
    }

    /// Server message from the last failed submit.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|err| err.message.as_str())
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Route to show next, set once a submit succeeds.
    pub fn navigate_to(&self) -> Option<Route> {
        self.navigate_to
    }

    /// Submits the form. On success navigation goes back to the feed; on
    /// failure the server message is kept and the form stays put.
    pub async fn submit(&mut self, client: &MovieClient) -> bool {
        match client.create(&self.form).await {
            Ok(()) => {
                self.error = None;
                self.navigate_to = Some(Route::Home);
                true
            }
            Err(err) => {
                tracing::warn!(title = %self.form.title, error = %err, "movie submit failed");
                self.error = Some(err);
                self.navigate_to = None;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::tests::context_for;
    use crate::session::{Session, SessionState};

    fn client(server: &MockServer) -> MovieClient {
        let session = SessionState::in_memory();
        session.sign_in(Session::new("abc", "bob")).unwrap();
        MovieClient::new(context_for(server, session))
    }

    #[tokio::test]
    async fn test_submit_success_navigates_home() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/movies"))
            .respond_with(ResponseTemplate::new(201).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;

        let mut form = CreateMovieController::with_form("Heat", "LA crime");
        assert!(form.submit(&client(&server)).await);
        assert_eq!(form.navigate_to(), Some(Route::Home));
        assert_eq!(form.error_message(), None);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_message_and_stays() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/movies"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "title required"})),
            )
            .mount(&server)
            .await;

        let mut form = CreateMovieController::default();
        assert!(!form.submit(&client(&server)).await);
        assert_eq!(form.error_message(), Some("title required"));
        assert_eq!(form.navigate_to(), None);
    }
}
