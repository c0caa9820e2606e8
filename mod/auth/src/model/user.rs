use serde::{Deserialize, Serialize};

/// Role assigned to a user. Routes are gated per role in the server's
/// auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Manager,
    Supervisor,
    ProjectManager,
    Inspector,
    LeadInspector,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Manager => "manager",
            Role::Supervisor => "supervisor",
            Role::ProjectManager => "project_manager",
            Role::Inspector => "inspector",
            Role::LeadInspector => "lead_inspector",
        }
    }
}

/// A user identity with password login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Login and display name.
    pub name: String,

    /// Argon2id password hash. Persisted with the document; API
    /// responses go through [`UserView`], which drops it.
    pub password_hash: String,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,

    /// Whether the user account is active.
    #[serde(default = "default_true")]
    pub active: bool,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// API-facing projection of a user. Same fields as [`User`] minus the
/// password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            email: user.email,
            telephone: user.telephone,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
}

/// Input for updating a user. A `None` password keeps the current hash.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "user001".into(),
            name: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Inspector,
            email: None,
            telephone: None,
            active: true,
            created_at: "2025-01-01T00:00:00+00:00".into(),
            updated_at: "2025-01-01T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn stored_document_keeps_the_hash() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(json.contains("argon2id"));

        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back.password_hash, "$argon2id$secret");
    }

    #[test]
    fn view_omits_the_hash() {
        let json = serde_json::to_string(&UserView::from(sample_user())).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"role\":\"inspector\""));
    }

    #[test]
    fn role_snake_case_roundtrip() {
        let role: Role = serde_json::from_str("\"lead_inspector\"").unwrap();
        assert_eq!(role, Role::LeadInspector);
        assert_eq!(role.as_str(), "lead_inspector");
    }
}
