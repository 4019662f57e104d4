use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use gateway_cell::ApiGateway;
use shared_config::AppConfig;
use shared_models::{ClientError, ProfileUpdate, RegisterData, User, UserRole};

#[derive(Debug, Clone)]
pub enum SessionState {
    /// Startup revalidation of the stored token has not settled yet.
    Uninitialized,
    Anonymous,
    Authenticated {
        user: User,
        profile: Option<Value>,
        token: String,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Role-based navigation targets handed back to the presentation layer after
/// login, registration and logout.
#[derive(Debug, Clone)]
struct RedirectPaths {
    home: String,
    patient_dashboard: String,
    doctor_dashboard: String,
    admin_dashboard: String,
}

/// Holds an in-progress flag for the lifetime of one auth operation. Clearing
/// happens in `Drop`, so the flag is released even when the owning future is
/// cancelled mid-await instead of staying set forever.
struct InProgressGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> InProgressGuard<'a> {
    fn acquire(flag: &'a mut bool) -> Option<Self> {
        if *flag {
            return None;
        }
        *flag = true;
        Some(Self { flag })
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// Tracks the authenticated identity and mediates every auth operation.
///
/// Owns the session for its lifetime: only this manager mutates the gateway
/// token or the current user. Failures land in a single current-error slot
/// (last error wins) holding display-ready text.
pub struct SessionManager {
    gateway: Arc<ApiGateway>,
    redirects: RedirectPaths,
    state: SessionState,
    is_loading: bool,
    error: Option<String>,
    op_in_progress: bool,
}

impl SessionManager {
    pub fn new(gateway: Arc<ApiGateway>, config: &AppConfig) -> Self {
        Self {
            gateway,
            redirects: RedirectPaths {
                home: config.home_path.clone(),
                patient_dashboard: config.patient_dashboard_path.clone(),
                doctor_dashboard: config.doctor_dashboard_path.clone(),
                admin_dashboard: config.admin_dashboard_path.clone(),
            },
            state: SessionState::Uninitialized,
            is_loading: true,
            error: None,
            op_in_progress: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&Value> {
        match &self.state {
            SessionState::Authenticated { profile, .. } => profile.as_ref(),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn redirect_for(&self, role: UserRole) -> String {
        match role {
            UserRole::Doctor => self.redirects.doctor_dashboard.clone(),
            UserRole::Admin => self.redirects.admin_dashboard.clone(),
            UserRole::Patient => self.redirects.patient_dashboard.clone(),
        }
    }

    fn fail(&mut self, message: String) {
        self.state = SessionState::Anonymous;
        self.error = Some(message);
        self.is_loading = false;
    }

    /// Revalidate any stored token against the backend on startup. Whatever
    /// happens here, the manager always settles out of the loading state; on
    /// any failure the stored token is cleared and the session is anonymous.
    pub async fn initialize(&mut self) {
        if let Some(token) = self.gateway.token() {
            match self.gateway.me().await {
                Ok(envelope) if envelope.success => {
                    if let Some(who) = envelope.data {
                        info!("Restored session for {}", who.user.username);
                        self.state = SessionState::Authenticated {
                            user: who.user,
                            profile: who.profile,
                            token,
                        };
                    } else {
                        self.gateway.set_token(None);
                        self.state = SessionState::Anonymous;
                    }
                }
                Ok(_) | Err(_) => {
                    debug!("Stored token rejected, clearing it");
                    self.gateway.set_token(None);
                    self.state = SessionState::Anonymous;
                }
            }
        } else {
            self.state = SessionState::Anonymous;
        }

        self.error = None;
        self.is_loading = false;
    }

    /// Authenticate with credentials. On success the session becomes
    /// authenticated and the role-based redirect target is returned; on
    /// failure the server's message lands in the error slot and the session
    /// stays anonymous.
    pub async fn login(&mut self, email: &str, password: &str) -> Option<String> {
        let guard = match InProgressGuard::acquire(&mut self.op_in_progress) {
            Some(guard) => guard,
            None => {
                warn!("Dropping login attempt: another auth operation is in flight");
                return None;
            }
        };
        self.is_loading = true;
        self.error = None;

        let result = self.gateway.login(email, password).await;
        drop(guard);

        match result {
            Ok(envelope) => {
                if envelope.success {
                    if let Some(data) = envelope.data {
                        let redirect = self.redirect_for(data.user.role);
                        info!("Logged in as {} ({})", data.user.username, data.user.role);
                        self.state = SessionState::Authenticated {
                            user: data.user,
                            profile: data.profile,
                            token: data.token,
                        };
                        self.is_loading = false;
                        Some(redirect)
                    } else {
                        self.fail("Login failed".to_string());
                        None
                    }
                } else {
                    self.fail(if envelope.message.is_empty() {
                        "Login failed".to_string()
                    } else {
                        envelope.message
                    });
                    None
                }
            }
            Err(err) => {
                self.fail(err.display_message());
                None
            }
        }
    }

    /// Same contract shape as [`login`], with the full registration payload.
    pub async fn register(&mut self, data: &RegisterData) -> Option<String> {
        let guard = match InProgressGuard::acquire(&mut self.op_in_progress) {
            Some(guard) => guard,
            None => {
                warn!("Dropping register attempt: another auth operation is in flight");
                return None;
            }
        };
        self.is_loading = true;
        self.error = None;

        let result = self.gateway.register(data).await;
        drop(guard);

        match result {
            Ok(envelope) => {
                if envelope.success {
                    if let Some(data) = envelope.data {
                        let redirect = self.redirect_for(data.user.role);
                        info!("Registered {} ({})", data.user.username, data.user.role);
                        self.state = SessionState::Authenticated {
                            user: data.user,
                            profile: data.profile,
                            token: data.token,
                        };
                        self.is_loading = false;
                        Some(redirect)
                    } else {
                        self.fail("Registration failed".to_string());
                        None
                    }
                } else {
                    self.fail(if envelope.message.is_empty() {
                        "Registration failed".to_string()
                    } else {
                        envelope.message
                    });
                    None
                }
            }
            Err(err) => {
                self.fail(err.display_message());
                None
            }
        }
    }

    /// End the session. The logout API call is best-effort; the local token
    /// is cleared and the session dropped to anonymous no matter what.
    /// Returns the home path as the redirect target.
    pub async fn logout(&mut self) -> String {
        if let Err(err) = self.gateway.logout().await {
            warn!("Logout call failed: {}", err);
        }

        self.gateway.set_token(None);
        self.state = SessionState::Anonymous;
        self.error = None;
        self.is_loading = false;
        self.redirects.home.clone()
    }

    /// Update the profile and, on success, re-fetch the cached user so
    /// server-side derived fields are reflected locally.
    pub async fn update_profile(&mut self, data: &ProfileUpdate) {
        // Last error wins: a stale error must not survive a newer operation.
        self.error = None;
        match self.gateway.update_profile(data).await {
            Ok(envelope) if envelope.success => {
                if let Err(err) = self.refresh_user().await {
                    warn!("Profile updated but refresh failed: {}", err);
                }
            }
            Ok(envelope) => {
                self.error = Some(if envelope.message.is_empty() {
                    "Profile update failed".to_string()
                } else {
                    envelope.message
                });
            }
            Err(err) => {
                self.error = Some(err.display_message());
            }
        }
    }

    pub async fn change_password(&mut self, current_password: &str, new_password: &str) {
        self.error = None;
        match self.gateway.change_password(current_password, new_password).await {
            Ok(envelope) if envelope.success => {}
            Ok(envelope) => {
                self.error = Some(if envelope.message.is_empty() {
                    "Password change failed".to_string()
                } else {
                    envelope.message
                });
            }
            Err(err) => {
                self.error = Some(err.display_message());
            }
        }
    }

    async fn refresh_user(&mut self) -> Result<(), ClientError> {
        let envelope = self.gateway.me().await?;
        let who = envelope.into_data()?;

        if let SessionState::Authenticated { user, profile, .. } = &mut self.state {
            *user = who.user;
            *profile = who.profile;
        }
        Ok(())
    }
}
