//! Delegated-access credential issued by the OAuth2 provider.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Access and refresh tokens with expiration tracking.
///
/// At most one credential is active process-wide; re-authorization
/// overwrites it, never merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Access token for API requests.
    pub access_token: String,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: String,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
    /// Scopes granted by the resource owner.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Credential {
    /// Check if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        // Consider expired if less than 5 minutes remaining
        self.expires_at < Utc::now() + Duration::minutes(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_at: DateTime<Utc>) -> Credential {
        Credential {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
            scopes: vec!["https://www.googleapis.com/auth/drive".to_string()],
        }
    }

    #[test]
    fn test_credential_expiration() {
        assert!(credential(Utc::now() - Duration::hours(1)).is_expired());
        assert!(!credential(Utc::now() + Duration::hours(1)).is_expired());
    }

    #[test]
    fn test_credential_near_expiration() {
        // Token expiring in 4 minutes should be considered expired (5 min buffer)
        assert!(credential(Utc::now() + Duration::minutes(4)).is_expired());
    }

    #[test]
    fn test_credential_serialization() {
        let cred = credential(Utc::now());
        let json = serde_json::to_string(&cred).unwrap();
        let deserialized: Credential = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.access_token, cred.access_token);
        assert_eq!(deserialized.refresh_token, cred.refresh_token);
        assert_eq!(deserialized.scopes, cred.scopes);
    }

    #[test]
    fn test_credential_missing_scopes_defaults_empty() {
        let json = r#"{
            "access_token": "a",
            "refresh_token": "r",
            "expires_at": "2026-01-01T00:00:00Z"
        }"#;
        let cred: Credential = serde_json::from_str(json).unwrap();
        assert!(cred.scopes.is_empty());
    }
}
