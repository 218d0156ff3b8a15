use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_LIFETIME_DAYS: i64 = 7;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 `header.claims.signature` tokens.
///
/// The secret is loaded once at startup and never changes afterwards.
pub struct TokenStore {
    secret: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").field("secret", &"<redacted>").finish()
    }
}

impl TokenStore {
    pub fn new(secret: Zeroizing<Vec<u8>>) -> Self {
        Self { secret }
    }

    pub fn issue(&self, identifier: &str) -> Result<String, AuthError> {
        self.issue_at(identifier, Utc::now())
    }

    pub fn issue_at(&self, identifier: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: identifier.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };
        let claims_json =
            serde_json::to_vec(&claims).map_err(|e| AuthError::Signing(e.to_string()))?;

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{message}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Identifier carried by a valid, unexpired token.
    pub fn subject(&self, token: &str) -> Result<String, AuthError> {
        self.subject_at(token, Utc::now())
    }

    pub fn subject_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(claims.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let claims_json = URL_SAFE_NO_PAD
            .decode(claims)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims: Claims =
            serde_json::from_slice(&claims_json).map_err(|_| AuthError::InvalidToken)?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims.sub)
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| AuthError::Signing(e.to_string()))
    }
}
