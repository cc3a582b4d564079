//! HS256 access tokens.
//!
//! A token carries the user id and role name. There are no refresh tokens;
//! clients log in again once a token expires.

use buildtrack_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required from every token.
const ISSUER: &str = "buildtrack";

/// Default access token lifetime in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

/// Token payload.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's database id.
    pub sub: DbId,
    /// The user's role name at login time.
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing secret and token lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load from `JWT_SECRET` (required) and `JWT_ACCESS_EXPIRY_MINS`
    /// (default `60`).
    ///
    /// # Panics
    ///
    /// Panics if the secret is missing or empty, or the expiry is not a
    /// positive number of minutes.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .expect("JWT_ACCESS_EXPIRY_MINS must be a whole number"),
            Err(_) => DEFAULT_ACCESS_EXPIRY_MINS,
        };
        assert!(
            access_token_expiry_mins > 0,
            "JWT_ACCESS_EXPIRY_MINS must be positive"
        );

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn expires_in_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Sign an access token for `user_id` acting as `role`.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iss: ISSUER.to_string(),
        iat,
        exp: iat + config.expires_in_secs(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, issuer and expiry, returning the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    // `sub` is numeric; jsonwebtoken only counts string subjects as present.
    validation.set_required_spec_claims(&["exp", "iss"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
