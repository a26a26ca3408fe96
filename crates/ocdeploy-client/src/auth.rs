//! Platform authentication.

use std::fmt;

use ocdeploy_core::config::PlatformConfig;
use reqwest::RequestBuilder;

use crate::error::{ClientError, ClientResult};

/// How requests authenticate against the platform API.
///
/// A token always wins: when one is configured, username and password
/// are ignored entirely.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Basic { username: String, password: String },
}

impl Credentials {
    pub fn resolve(
        token: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Option<Self> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            return Some(Credentials::Bearer(token.to_string()));
        }
        match (username, password) {
            (Some(username), Some(password)) => Some(Credentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        }
    }

    pub fn from_platform(config: &PlatformConfig) -> ClientResult<Self> {
        Self::resolve(
            config.token.as_deref(),
            config.username.as_deref(),
            config.password.as_deref(),
        )
        .ok_or_else(|| ClientError::Config("no token or username/password configured".into()))
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Credentials::Bearer(_) => "bearer",
            Credentials::Basic { .. } => "basic",
        }
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Bearer(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_wins_over_username_password() {
        let creds = Credentials::resolve(Some("tok"), Some("admin"), Some("pw")).unwrap();
        assert_eq!(creds, Credentials::Bearer("tok".to_string()));
        assert_eq!(creds.scheme(), "bearer");
    }

    #[test]
    fn basic_used_without_token() {
        let creds = Credentials::resolve(None, Some("admin"), Some("pw")).unwrap();
        assert_eq!(
            creds,
            Credentials::Basic {
                username: "admin".to_string(),
                password: "pw".to_string()
            }
        );
    }

    #[test]
    fn empty_token_falls_back_to_basic() {
        let creds = Credentials::resolve(Some(""), Some("admin"), Some("pw")).unwrap();
        assert_eq!(creds.scheme(), "basic");
    }

    #[test]
    fn nothing_configured() {
        assert!(Credentials::resolve(None, None, None).is_none());
        assert!(Credentials::resolve(None, Some("admin"), None).is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let bearer = format!("{:?}", Credentials::Bearer("tok-123".to_string()));
        assert!(!bearer.contains("tok-123"));

        let basic = format!(
            "{:?}",
            Credentials::Basic {
                username: "admin".to_string(),
                password: "pw-456".to_string()
            }
        );
        assert!(basic.contains("admin"));
        assert!(!basic.contains("pw-456"));
    }
}
