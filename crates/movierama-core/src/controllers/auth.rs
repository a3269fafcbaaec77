//! Login and registration forms.

use crate::api::{AuthClient, RegisterRequest};
use crate::session::{Session, SessionState};

#[derive(Debug, Default)]
pub struct LoginController {
    pub is_logged_in: bool,
    pub is_login_failed: bool,
    pub error_message: Option<String>,
    pub username: Option<String>,
}

impl LoginController {
    /// Reflects an existing session, if any.
    pub fn init(session: &SessionState) -> Self {
        let username = session.username();
        Self {
            is_logged_in: username.is_some(),
            username,
            ..Self::default()
        }
    }

    /// Logs in and, on success, persists and publishes the session.
    ///
    /// A failed login is recorded on the controller and is never fatal.
    pub async fn submit(
        &mut self,
        client: &AuthClient,
        session: &SessionState,
        username: &str,
        password: &str,
    ) -> bool {
        let response = match client.login(username, password).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(username, error = %err, "login failed");
                self.fail(err.message);
                return false;
            }
        };

        let username = response.username.clone();
        if let Err(err) = session.sign_in(Session::new(response.token, response.username)) {
            tracing::warn!(username = %username, error = %err, "could not store session");
            self.fail(format!("{err:#}"));
            return false;
        }

        self.is_logged_in = true;
        self.is_login_failed = false;
        self.error_message = None;
        self.username = Some(username);
        true
    }

    fn fail(&mut self, message: String) {
        self.is_logged_in = false;
        self.is_login_failed = true;
        self.error_message = Some(message);
    }
}

#[derive(Debug, Default)]
pub struct RegisterController {
    pub is_successful: bool,
    pub is_signup_failed: bool,
    pub error_message: Option<String>,
}

impl RegisterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&mut self, client: &AuthClient, form: &RegisterRequest) -> bool {
        match client.register(form).await {
            Ok(()) => {
                self.is_successful = true;
                self.is_signup_failed = false;
                self.error_message = None;
                true
            }
            Err(err) => {
                tracing::warn!(username = %form.username, error = %err, "registration failed");
                self.is_successful = false;
                self.is_signup_failed = true;
                self.error_message = Some(err.message);
                false
            }
        }
    }
}
