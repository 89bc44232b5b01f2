//! Identity-provider settings consumed by the token store

use common::Secret;

/// Provider endpoints and client registration.
///
/// `endpoint` is the provider base URL; `authorize_path` and `token_path`
/// are appended to it verbatim.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub endpoint: String,
    pub authorize_path: String,
    pub token_path: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
}

impl AuthConfig {
    /// Full token endpoint URL
    pub fn token_url(&self) -> String {
        format!("{}{}", self.endpoint, self.token_path)
    }

    /// Authorization endpoint URL without query parameters
    pub fn authorize_base(&self) -> String {
        format!("{}{}", self.endpoint, self.authorize_path)
    }
}

#[cfg(test)]
pub(crate) fn test_config(endpoint: &str) -> AuthConfig {
    AuthConfig {
        endpoint: endpoint.to_string(),
        authorize_path: "/connect/authorize".into(),
        token_path: "/connect/token".into(),
        client_id: "docarts-client".into(),
        client_secret: Secret::new("docarts-secret".to_string()),
        redirect_uri: "http://localhost:3000".into(),
    }
}
