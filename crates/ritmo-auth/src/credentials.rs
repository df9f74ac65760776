//! Credential verification against the user directory.

use std::sync::Arc;

use tracing::debug;

use ritmo_core::error::AppError;
use ritmo_entity::user::User;

use crate::password::PasswordHasher;
use crate::session::UserDirectory;

/// Verifies login credentials.
///
/// The identifier is dispatched on shape: anything containing `@` is
/// treated as an email, everything else as a username. Unknown identifier
/// and wrong password produce the same client-visible error.
#[derive(Clone)]
pub struct CredentialVerifier {
    directory: Arc<dyn UserDirectory>,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier").finish()
    }
}

impl CredentialVerifier {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            directory,
            hasher: PasswordHasher::new(),
        }
    }

    /// Resolve the identifier and check the password against the stored hash.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> Result<User, AppError> {
        let user = if identifier.contains('@') {
            self.directory.find_by_email(identifier).await?
        } else {
            self.directory.find_by_username(identifier).await?
        };

        // Which case failed is logged for audit, never surfaced to clients.
        let Some(user) = user else {
            debug!(identifier = %identifier, "Login failed: unknown identifier");
            return Err(AppError::invalid_credentials());
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.public_id, "Login failed: password mismatch");
            return Err(AppError::invalid_credentials());
        }

        Ok(user)
    }
}
