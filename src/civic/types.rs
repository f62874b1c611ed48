use serde::{Deserialize, Serialize};
use std::fmt;

/// Which credential set to authenticate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => f.write_str("sandbox"),
            Environment::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationScope {
    Captcha,
    Uniqueness,
    Liveness,
    IdVerification,
    #[default]
    All,
}

impl VerificationScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationScope::Captcha => "captcha",
            VerificationScope::Uniqueness => "uniqueness",
            VerificationScope::Liveness => "liveness",
            VerificationScope::IdVerification => "id_verification",
            VerificationScope::All => "all",
        }
    }
}

/// OAuth2 token endpoint response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_wire_names() {
        let scope: VerificationScope = serde_json::from_str("\"id_verification\"").unwrap();
        assert_eq!(scope, VerificationScope::IdVerification);
        assert_eq!(scope.as_str(), "id_verification");
        assert_eq!(VerificationScope::default(), VerificationScope::All);
    }

    #[test]
    fn test_environment_defaults_to_sandbox() {
        assert_eq!(Environment::default(), Environment::Sandbox);
        let env: Environment = serde_json::from_str("\"production\"").unwrap();
        assert_eq!(env.to_string(), "production");
    }

    #[test]
    fn test_auth_response_optional_fields() {
        let auth: AuthResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":3600}"#).unwrap();
        assert_eq!(auth.expires_in, 3600);
        assert!(auth.token_type.is_empty());
        assert!(!format!("{:?}", auth).contains("abc"));
    }
}
