//! Authentication API client methods

use super::{ApiClient, ClientError, request::ApiRequest};
use crate::types::{
    ChangePasswordRequest, GoogleLoginRequest, LoginRequest, LoginResponse, LogoutRequest,
    PasswordResetRequest, RegisterRequest, RegisteredUser, ResetMethod, ResetWithOtpRequest,
    ResetWithTokenRequest, User, UserUpdate,
};
use std::borrow::Cow;
use tracing::{debug, info, warn};

impl ApiClient {
    /// Create an account (public endpoint)
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser, ClientError> {
        let req = ApiRequest::post("/accounts/register/").json(request)?;
        self.execute_public(req).await
    }

    /// Sign in with email and password and store the issued tokens
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let req = ApiRequest::post("/accounts/token/").json(&LoginRequest {
            username: email.to_string(),
            password: password.to_string(),
        })?;
        let response: LoginResponse = self.execute_public(req).await?;

        self.start_session(&response.access, &response.refresh);
        info!("Signed in as {email}");
        Ok(response)
    }

    /// Exchange a Google ID token for a session and store the issued tokens
    pub async fn google_login(&self, id_token: &str) -> Result<LoginResponse, ClientError> {
        let req = ApiRequest::post("/accounts/google/").json(&GoogleLoginRequest {
            token: id_token.to_string(),
        })?;
        let response: LoginResponse = self.execute_public(req).await?;

        self.start_session(&response.access, &response.refresh);
        match &response.user {
            Some(user) => info!("Signed in with Google as {}", user.email),
            None => info!("Signed in with Google"),
        }
        Ok(response)
    }

    /// Get the signed-in user's profile
    pub async fn me(&self) -> Result<User, ClientError> {
        self.execute(ApiRequest::get("/accounts/me/")).await
    }

    /// Update fields of the signed-in user's profile
    pub async fn update_me(&self, update: &UserUpdate) -> Result<User, ClientError> {
        if update.is_empty() {
            return Err(ClientError::Validation("no profile fields to update".into()));
        }
        let req = ApiRequest::patch("/accounts/me/").json(update)?;
        self.execute(req).await
    }

    /// Change the signed-in user's password
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let req = ApiRequest::post("/accounts/change-password/").json(&ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        })?;
        self.execute_empty(req).await
    }

    /// Sign out
    ///
    /// With a refresh token stored, the server is asked to revoke it. The
    /// call is best effort; the stored tokens are cleared whatever its
    /// outcome. Without one there is nothing to revoke and no call is made.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = if self.tokens().refresh().is_some() {
            self.revoke_refresh_token().await
        } else {
            debug!("No refresh token stored, skipping server logout");
            Ok(())
        };

        self.tokens().clear();
        match &result {
            Ok(()) => info!("Signed out"),
            Err(e) => warn!("Logout call failed, local session cleared anyway: {e}"),
        }
        result
    }

    /// The body is read from the store on each attempt: refreshing an expired
    /// access token may rotate the refresh token the server has to revoke.
    async fn revoke_refresh_token(&self) -> Result<(), ClientError> {
        self.send_rebuilt(|| {
            let body = LogoutRequest {
                refresh: self.tokens().refresh(),
            };
            Ok(Cow::Owned(ApiRequest::post("/accounts/logout/").json(&body)?))
        })
        .await?;
        Ok(())
    }

    /// Ask for a password reset email (public endpoint)
    pub async fn request_password_reset(
        &self,
        email: &str,
        method: ResetMethod,
    ) -> Result<(), ClientError> {
        let req = ApiRequest::post("/accounts/auth/request-reset/").json(&PasswordResetRequest {
            email: email.to_string(),
            method,
        })?;
        self.execute_public_empty(req).await
    }

    /// Set a new password with the token from a reset link (public endpoint)
    pub async fn reset_password_with_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let req = ApiRequest::post("/accounts/auth/reset-password/").json(&ResetWithTokenRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        })?;
        self.execute_public_empty(req).await
    }

    /// Set a new password with an emailed one-time password (public endpoint)
    pub async fn reset_password_with_otp(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let req = ApiRequest::post("/accounts/auth/verify-otp/").json(&ResetWithOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
            new_password: new_password.to_string(),
        })?;
        self.execute_public_empty(req).await
    }

    /// Resume a stored session at application start
    ///
    /// Returns `None` without any network call when no access token is
    /// stored. Otherwise fetches the profile, refreshing the token on demand;
    /// if that fails the stored tokens are discarded.
    pub async fn restore_session(&self) -> Option<User> {
        self.tokens().access()?;

        match self.me().await {
            Ok(user) => {
                info!("Resumed session for {}", user.email);
                Some(user)
            }
            Err(e) => {
                warn!("Stored session could not be resumed: {e}");
                self.tokens().clear();
                None
            }
        }
    }
}
