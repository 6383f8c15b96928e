use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Accepts every request as anonymous. Only used when `auth.method = "none"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoneAuthenticator;

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

/// Validates a shared API key sent as `Authorization: Bearer <key>` or
/// `X-API-Key: <key>`.
pub struct ApiKeyAuthenticator {
    expected: String,
}

impl ApiKeyAuthenticator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            expected: api_key.into(),
        }
    }

    fn presented_key<'a>(request: &'a AuthRequest) -> Option<&'a str> {
        let bearer = request.header("authorization").and_then(|value| {
            let (scheme, key) = value.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then_some(key.trim())
        });
        bearer.or_else(|| request.header("x-api-key"))
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let presented = Self::presented_key(request).ok_or(AuthError::NotAuthenticated)?;

        if keys_match(presented.as_bytes(), self.expected.as_bytes()) {
            Ok(Identity {
                subject: "api_key_admin".to_string(),
                method: "api_key".to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials("Invalid API key".to_string()))
        }
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}

/// Length-checked comparison that touches every byte.
fn keys_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
