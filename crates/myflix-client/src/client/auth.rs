use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, LoginResponse, NewUser, User};
use crate::validation;

use super::ApiClient;

impl ApiClient {
    /// Creates an account. The form is validated locally first.
    pub async fn register(&self, user: &NewUser) -> ApiResult<User> {
        validation::validate_new_user(user)?;
        tracing::info!("Registering {}", user.username);

        let body = self
            .send(self.http.post(self.url(&["users"])?).json(user))
            .await?;
        let mut created = self.normalizer.user(&body);
        if created.username.is_empty() {
            created.username = user.username.clone();
        }
        Ok(created)
    }

    /// Exchanges credentials for a token. Persisting it is up to the caller.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let request = self
            .http
            .post(self.url(&["login"])?)
            .json(&LoginRequest { username, password });

        let body = self.send(request).await.map_err(|e| match e {
            err @ (ApiError::Network(_) | ApiError::Auth(_)) => err,
            ApiError::Validation { message, .. }
            | ApiError::NotFound(message)
            | ApiError::Unknown(message) => ApiError::Auth(message),
            ApiError::NoSession => ApiError::Auth("Login failed".to_string()),
        })?;

        let mut login = self.normalizer.login(&body)?;
        if login.user.username.is_empty() {
            login.user.username = username.to_string();
        }
        tracing::info!("Login succeeded");
        Ok(login)
    }
}
