//! User profile types shared between the REST client and the session layer

use serde::{Deserialize, Serialize};

/// Account role, a closed set defined by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Company,
    User,
    SuperAdmin,
}

impl Role {
    /// Roles with administrative reach over the portal
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

/// Access level granted on a module. Levels are ordered: `Read < Write < Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Read,
    Write,
    Full,
}

/// A single module permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub module: String,
    pub access: AccessLevel,
}

/// Profile of the signed-in user as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, alias = "isVerified")]
    pub is_email_verified: bool,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl UserProfile {
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the user holds at least `level` on `module`.
    ///
    /// Super admins pass every check.
    pub fn has_permission(&self, module: &str, level: AccessLevel) -> bool {
        if self.role == Role::SuperAdmin {
            return true;
        }
        self.permissions
            .iter()
            .any(|p| p.module.eq_ignore_ascii_case(module) && p.access >= level)
    }
}
