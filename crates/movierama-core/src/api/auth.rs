//! Login and registration calls.

use serde::{Deserialize, Serialize};

use super::{ApiContext, ApiResult, decode};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login payload.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &crate::session::mask_token(&self.token))
            .field("username", &self.username)
            .finish()
    }
}

/// Registration form as sent to the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Client for `/api/v1/auth/*`.
///
/// One network attempt per call; server errors come back unmodified as
/// [`super::ApiError`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    ctx: ApiContext,
}

impl AuthClient {
    pub fn new(ctx: ApiContext) -> Self {
        Self { ctx }
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let url = self.ctx.endpoints().login();
        let body = self
            .ctx
            .post(url, Some(&LoginRequest { username, password }))
            .await?;
        decode(&body, "login")
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        let url = self.ctx.endpoints().register();
        self.ctx.post(url, Some(request)).await?;
        tracing::info!(username = %request.username, "account registered");
        Ok(())
    }
}
