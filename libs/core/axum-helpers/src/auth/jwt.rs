use super::config::JwtConfig;
use super::verifier::{AuthError, AuthUser, TokenVerifier};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

/// Default lifetime of tokens minted by [`JwtVerifier::issue`].
pub const ACCESS_TOKEN_TTL: i64 = 3600; // 1 hour

/// Claims carried by storefront access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // Verified email, used as reviewer identity
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// HS256 verifier for tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;

        let mut required = vec!["exp", "sub"];
        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match config.audience {
            Some(ref audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        validation.set_required_spec_claims(&required);

        tracing::info!(
            issuer = ?config.issuer,
            audience = ?config.audience,
            "JWT verifier initialized"
        );

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Mint a token for `user` valid for `ttl_seconds`.
    pub fn issue(&self, user: &AuthUser, ttl_seconds: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.subject_id.clone(),
            email: user.email.clone(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Verify the signature and registered claims, returning the decoded claims.
    pub fn decode_claims(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.decode_claims(token)?;
        if claims.email.is_empty() {
            return Err(AuthError::InvalidToken("missing email claim".into()));
        }
        Ok(AuthUser {
            subject_id: claims.sub,
            email: claims.email,
        })
    }
}
