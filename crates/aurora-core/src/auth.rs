use aurora_common::{AuroraError, EnvSecrets, Result};

/// Single shared admin password check
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    password: Option<String>,
}

impl AdminGate {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
        }
    }

    pub fn from_secrets(secrets: &EnvSecrets) -> Self {
        Self::new(secrets.admin_password().map(str::to_string))
    }

    /// Whether a password is configured at all
    pub fn is_protected(&self) -> bool {
        self.password.is_some()
    }

    /// With no password configured every attempt succeeds
    pub fn verify(&self, attempt: &str) -> bool {
        match &self.password {
            Some(expected) => expected == attempt,
            None => true,
        }
    }

    pub fn require(&self, attempt: Option<&str>) -> Result<()> {
        if !self.is_protected() || attempt.is_some_and(|a| self.verify(a)) {
            Ok(())
        } else {
            Err(AuroraError::Unauthorized)
        }
    }
}
