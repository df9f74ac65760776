//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available to Ritmo accounts.
///
/// The lifecycle engine only cares about the privileged/unprivileged
/// split; finer-grained permissions live outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular account.
    User,
    /// Can moderate shared content, but not administer the system.
    Moderator,
    /// System administrator.
    Admin,
    /// Super-administrator.
    SysAdmin,
}

impl UserRole {
    /// Check if this role may call privileged endpoints.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::SysAdmin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::SysAdmin => "sysadmin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ritmo_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            "sysadmin" => Ok(Self::SysAdmin),
            _ => Err(ritmo_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: user, moderator, admin, sysadmin"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_split() {
        assert!(UserRole::Admin.is_privileged());
        assert!(UserRole::SysAdmin.is_privileged());
        assert!(!UserRole::Moderator.is_privileged());
        assert!(!UserRole::User.is_privileged());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("USER".parse::<UserRole>().unwrap(), UserRole::User);
        assert!("owner".parse::<UserRole>().is_err());
    }
}
