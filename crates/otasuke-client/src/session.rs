//! Signed-in user state on top of an [`ApiClient`].

use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::client::{ApiClient, ApiRequest};
use crate::error::{ApiError, Result};
use crate::guard::{self, GuardContext, GuardDecision};
use crate::models::{
    CompanyResponse, LoginRequest, RegisterRequest, TokenResponse, UserResponse, UserRole,
};
use crate::validation::Validate;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const ME_PATH: &str = "/auth/me";

#[derive(Default)]
struct SessionState {
    /// `restore`, `login` or `logout` has run at least once.
    ready: bool,
    user: Option<UserResponse>,
    company: Option<CompanyResponse>,
}

/// Authentication state for one user of the Backend API.
pub struct AuthSession {
    client: ApiClient,
    state: RwLock<SessionState>,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Sign in and load the user's profile and company.
    ///
    /// A rejected password surfaces as [`ApiError::Unauthorized`](crate::ApiError::Unauthorized)
    /// without attempting a credential refresh.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        body.validate()?;

        let request = ApiRequest::post(LOGIN_PATH).json(&body)?.retried(true);
        let tokens: TokenResponse = self.client.execute(request).await?;
        self.client.tokens().set_tokens(&tokens.into_pair())?;

        let user = self.refresh_user().await?;
        self.refresh_company().await?;
        self.state.write().ready = true;

        info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(user)
    }

    /// Create an account, then sign in with it.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<UserResponse> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            role,
        };
        body.validate()?;

        let created: UserResponse = self.client.post_json(REGISTER_PATH, &body).await?;
        info!(user_id = %created.id, %role, "Account registered");

        self.login(email, password).await
    }

    /// End the session.
    ///
    /// Any refresh still in flight is abandoned and its result discarded.
    /// Unlike a failed refresh this does not redirect to the login page.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        let rejected = self.client.coordinator().reset();
        if rejected > 0 {
            debug!(rejected, "Abandoned requests waiting on refresh");
        }
        self.forget();
        self.state.write().ready = true;
        self.client.tokens().clear()?;
        info!("Signed out");
        Ok(())
    }

    /// Resume a session from stored credentials.
    ///
    /// Returns the signed-in user, or `None` when no usable session exists.
    /// Stored credentials that fail to load a profile are discarded.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<UserResponse>> {
        if !self.client.tokens().has_access_token() {
            debug!("No stored session");
            self.state.write().ready = true;
            return Ok(None);
        }

        let restored = async {
            let user = self.refresh_user().await?;
            self.refresh_company().await?;
            Ok::<_, ApiError>(user)
        }
        .await;

        let outcome = match restored {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "Stored session is unusable, discarding");
                self.forget();
                self.client.tokens().clear()?;
                None
            }
        };
        self.state.write().ready = true;
        Ok(outcome)
    }

    /// Reload the signed-in user's profile.
    pub async fn refresh_user(&self) -> Result<UserResponse> {
        match self.client.get_json::<UserResponse>(ME_PATH).await {
            Ok(user) => {
                self.state.write().user = Some(user.clone());
                Ok(user)
            }
            Err(e) => {
                if e.requires_relogin() {
                    self.forget();
                }
                Err(e)
            }
        }
    }

    /// Reload the signed-in user's company. `None` means none is registered.
    pub async fn refresh_company(&self) -> Result<Option<CompanyResponse>> {
        let company = self.client.companies().mine().await?;
        self.state.write().company = company.clone();
        Ok(company)
    }

    pub fn user(&self) -> Option<UserResponse> {
        self.state.read().user.clone()
    }

    pub fn company(&self) -> Option<CompanyResponse> {
        self.state.read().company.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().user.is_some()
    }

    /// Evaluate page access for the current session.
    pub fn guard(&self, current_path: &str, required_role: Option<UserRole>) -> GuardDecision {
        let state = self.state.read();
        guard::evaluate(
            &GuardContext {
                loading: !state.ready,
                user: state.user.as_ref(),
                has_company: state.company.is_some(),
                current_path,
            },
            required_role,
        )
    }

    fn forget(&self) {
        let mut state = self.state.write();
        state.user = None;
        state.company = None;
    }
}
