use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{AccountUser, LoginInput, LoginSession, RegisterInput};
use super::errors::{AuthError, RepositoryError};
use super::repository::UserRepository;
use super::token::TokenService;

pub const LOGIN_MESSAGE: &str = "You are logged in";
pub const DELETED_MESSAGE: &str = "Sad to see you go, your account was deleted.";

/// Pull the token out of an `Authorization` header value.
///
/// When the value mentions `Bearer` the second whitespace-separated segment is
/// the token; otherwise the whole value is. Missing segments yield `""`, which
/// never verifies.
pub fn extract_token(header: &str) -> &str {
    if header.contains("Bearer") {
        header.split_whitespace().nth(1).unwrap_or("")
    } else {
        header.trim()
    }
}

/// Account workflows independent of web framework
pub struct AccountService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R: UserRepository + ?Sized> AccountService<R> {
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Authenticate and issue an access token.
    ///
    /// Every failure, whatever its cause, is reported as `Unauthorized` so
    /// callers cannot tell an unknown user from a wrong password.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginSession, AuthError> {
        let user = self
            .repo
            .authenticate(&input.username, &input.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "authentication failed");
                AuthError::Unauthorized(e.to_string())
            })?;

        let access_token = self.tokens.issue(&user).map_err(|e| {
            warn!(user_id = %user.id, error = %e, "token issuance failed");
            AuthError::Unauthorized(e.to_string())
        })?;

        info!(user_id = %user.id, "user_logged_in");
        Ok(LoginSession { user, access_token })
    }

    /// Register a new user. No token is issued.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AccountService, TokenService, repository::mock::MockUserRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// # let pem = |name: &str| std::fs::read(format!("{}/testdata/{name}", env!("CARGO_MANIFEST_DIR"))).unwrap();
    /// let tokens = TokenService::from_pem(&pem("signing_private.pem"), &pem("signing_public.pem"), std::time::Duration::from_secs(3600)).unwrap();
    /// let svc = AccountService::new(Arc::new(MockUserRepository::default()), Arc::new(tokens));
    /// let input = RegisterInput {
    ///     username: Some("ada".into()), password: Some("Secret123".into()),
    ///     first_name: Some("Ada".into()), last_name: Some("Lovelace".into()),
    ///     email: Some("ada@example.com".into()), admin: None,
    /// };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "ada");
    /// ```
    #[instrument(skip(self, input), fields(username = input.username.as_deref().unwrap_or("")))]
    pub async fn register(&self, input: RegisterInput) -> Result<AccountUser, AuthError> {
        match self.repo.create(input).await {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "user_registered");
                Ok(user)
            }
            Err(RepositoryError::Duplicate(cause)) => Err(AuthError::Conflict(cause)),
            Err(RepositoryError::Validation(cause)) => Err(AuthError::ValidationFailed(cause)),
            Err(e @ RepositoryError::InvalidCredentials) => {
                Err(AuthError::Unknown { status: None, message: e.to_string() })
            }
            Err(RepositoryError::Backend { status, message }) => {
                Err(AuthError::Unknown { status, message })
            }
        }
    }

    /// Delete the account named by the token in `authorization`.
    ///
    /// The token's subject is the only authorization; deleting an id that is
    /// already gone still succeeds.
    #[instrument(skip(self, authorization))]
    pub async fn delete_account(&self, authorization: Option<&str>) -> Result<Uuid, AuthError> {
        let token = extract_token(authorization.unwrap_or(""));
        let claims = self.tokens.verify(token).map_err(|e| {
            warn!(error = %e, "token verification failed");
            AuthError::Unauthorized(format!("invalid authentication token, authorization denied: {e}"))
        })?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
            AuthError::Unauthorized(format!("token subject `{}` is not a user id: {e}", claims.sub))
        })?;

        match self.repo.delete_by_id(user_id).await {
            Ok(removed) => {
                info!(%user_id, existed = removed, "user_deleted");
                Ok(user_id)
            }
            Err(RepositoryError::Backend { status: Some(500), message }) => Err(AuthError::Internal(message)),
            Err(RepositoryError::Backend { status, message }) => Err(AuthError::Unknown { status, message }),
            Err(e @ (RepositoryError::Validation(_)
            | RepositoryError::Duplicate(_)
            | RepositoryError::InvalidCredentials)) => {
                Err(AuthError::Unknown { status: None, message: e.to_string() })
            }
        }
    }
}
