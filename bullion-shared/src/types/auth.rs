use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    GeneralUser,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::GeneralUser => write!(f, "GENERAL_USER"),
            UserRole::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GENERAL_USER" => Ok(UserRole::GeneralUser),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Purpose of a signed token. Both kinds share one claims layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Identity and authorization context embedded in general-user tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralUserClaims {
    pub user_id: Uuid,
    pub bullion_id: Uuid,
    pub role: UserRole,
    pub kind: TokenKind,
}

impl GeneralUserClaims {
    pub fn new(user_id: Uuid, bullion_id: Uuid, role: UserRole, kind: TokenKind) -> Self {
        Self { user_id, bullion_id, role, kind }
    }

    pub fn with_kind(&self, kind: TokenKind) -> Self {
        Self { kind, ..self.clone() }
    }
}

/// Caller resolved from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthGeneralUser {
    pub id: Uuid,
    pub bullion_id: Uuid,
    pub role: UserRole,
}

impl From<GeneralUserClaims> for AuthGeneralUser {
    fn from(claims: GeneralUserClaims) -> Self {
        Self {
            id: claims.user_id,
            bullion_id: claims.bullion_id,
            role: claims.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
