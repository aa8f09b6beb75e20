//! Login, logout and the current account

use super::{ClientError, InvoiceClient};
use crate::client::error::CancelReason;
use crate::client::middleware::ApiRequest;
use gstpro_core::{TokenResponse, User};
use tracing::{info, instrument};

impl InvoiceClient {
    /// Exchange credentials for a token and start a session
    ///
    /// Any previous session is dropped first so a stale token cannot block
    /// the login request itself. The token and user record are stored only
    /// once both calls succeed.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        self.session().clear();

        let request =
            ApiRequest::post("/auth/login").form(&[("username", email), ("password", password)]);
        let token: TokenResponse = self.execute(request).await?;

        let request = ApiRequest::get("/users/me")
            .with_bearer(&token.access_token)
            .map_err(|e| ClientError::RequestCancelled(CancelReason::TokenInvalid(e.to_string())))?;
        let user: User = self.execute(request).await?;

        self.session().establish(&token.access_token, &user)?;
        info!(user_id = user.id, "Logged in");
        Ok(user)
    }

    /// End the session locally; the server keeps no session to revoke
    pub fn logout(&self) {
        self.session().clear();
        info!("Logged out");
    }

    /// Account that owns the current token
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.execute(ApiRequest::get("/users/me")).await
    }
}
