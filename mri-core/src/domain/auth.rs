//! MRI API credentials and the Basic auth header built from them

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Composite identity used to authenticate against the MRI API
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthIdentity {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub api_username: String,
    #[serde(default)]
    pub developer_key: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for AuthIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthIdentity")
            .field("client_id", &self.client_id)
            .field("database_name", &self.database_name)
            .field("api_username", &self.api_username)
            .field("developer_key", &"[redacted]")
            .field("password", &"[redacted]")
            .finish()
    }
}

impl AuthIdentity {
    /// `clientId/databaseName/apiUsername/developerKey`
    pub fn username(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.client_id, self.database_name, self.api_username, self.developer_key
        )
    }

    /// Build the `Authorization` header value for this identity.
    ///
    /// Fields are used verbatim; nothing is validated.
    pub fn auth_header(&self) -> AuthHeader {
        let credentials = format!("{}:{}", self.username(), self.password);
        let token = base64::engine::general_purpose::STANDARD.encode(credentials);
        AuthHeader(format!("Basic {}", token))
    }
}

/// `Basic <token>` header value, built once per run
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader(String);

impl AuthHeader {
    pub const NAME: &'static str = "Authorization";

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthHeader(Basic [redacted])")
    }
}
