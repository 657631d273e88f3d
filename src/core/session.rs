use crate::config::AdminConfig;
use crate::domain::ports::CredentialVerifier;
use crate::utils::error::{Result, SchoolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// 固定的一組管理員帳密
#[derive(Clone)]
pub struct FixedCredentials {
    username: String,
    password: String,
}

impl FixedCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&AdminConfig> for FixedCredentials {
    fn from(config: &AdminConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl CredentialVerifier for FixedCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// 管理區的登入狀態，只存在於本次執行期間
pub struct AuthGate {
    state: SessionState,
    verifier: Box<dyn CredentialVerifier>,
}

impl AuthGate {
    pub fn new(verifier: impl CredentialVerifier + 'static) -> Self {
        Self {
            state: SessionState::LoggedOut,
            verifier: Box::new(verifier),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.state == SessionState::LoggedIn
    }

    /// 帳密錯誤時狀態不變
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if self.verifier.verify(username, password) {
            self.state = SessionState::LoggedIn;
            tracing::info!("Admin logged in");
            Ok(())
        } else {
            tracing::warn!("⚠️ Rejected login attempt for '{}'", username);
            Err(SchoolError::Authentication)
        }
    }

    pub fn logout(&mut self) {
        if self.is_logged_in() {
            tracing::info!("Admin logged out");
        }
        self.state = SessionState::LoggedOut;
    }

    pub fn require_login(&self) -> Result<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(SchoolError::NotAuthenticated)
        }
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(FixedCredentials::from(&AdminConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_logged_out() {
        let gate = AuthGate::default();
        assert_eq!(gate.state(), SessionState::LoggedOut);
        assert!(matches!(gate.require_login(), Err(SchoolError::NotAuthenticated)));
    }

    #[test]
    fn test_default_credentials_log_in() {
        let mut gate = AuthGate::default();
        gate.login("admin", "1234").unwrap();
        assert_eq!(gate.state(), SessionState::LoggedIn);
        assert!(gate.require_login().is_ok());
    }

    #[test]
    fn test_wrong_credentials_leave_state_unchanged() {
        let mut gate = AuthGate::default();

        for (user, pass) in [("admin", "12345"), ("Admin", "1234"), ("", ""), ("root", "1234")] {
            let result = gate.login(user, pass);
            assert!(matches!(result, Err(SchoolError::Authentication)));
            assert_eq!(gate.state(), SessionState::LoggedOut);
        }

        gate.login("admin", "1234").unwrap();
        assert!(gate.login("admin", "wrong").is_err());
        assert_eq!(gate.state(), SessionState::LoggedIn);
    }

    #[test]
    fn test_logout_always_returns_to_logged_out() {
        let mut gate = AuthGate::default();
        gate.logout();
        assert_eq!(gate.state(), SessionState::LoggedOut);

        gate.login("admin", "1234").unwrap();
        gate.logout();
        gate.logout();
        assert_eq!(gate.state(), SessionState::LoggedOut);
    }

    #[test]
    fn test_injected_verifier() {
        let mut gate = AuthGate::new(|user: &str, pass: &str| user == "principal" && pass.len() > 3);

        assert!(gate.login("admin", "1234").is_err());
        assert!(gate.login("principal", "long-enough").is_ok());
    }
}
