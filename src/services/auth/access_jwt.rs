use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::{error::Error as StdError, fmt};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    EmptySecret,
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "shared secret must not be empty"),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

/// Access token (JWT) claims.
///
/// The principal lives in a nested object: `{"user": {"id": "..."}}`.
/// Registered claims are optional; `Validation` enforces `exp`/`nbf` from the
/// raw payload when they are present, so they are not mirrored here.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub user: UserClaim,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserClaim {
    pub id: String,
}

/// Verified identity handed to the middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: String,
}

/// HS256 access-token verifier.
///
/// - The shared secret is injected at construction and never printed.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    fingerprint: String,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(secret: &[u8], leeway_seconds: u64) -> Result<Self, AccessJwtError> {
        if secret.is_empty() {
            return Err(AccessJwtError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens minted by the login service carry no aud/iss and may omit exp.
        validation.set_required_spec_claims::<&str>(&[]);
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            fingerprint: secret_fingerprint(secret),
        })
    }

    // Verify and decode a JWT access token.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify + strict claim validation, then convert into the identity type.
    ///
    /// `jsonwebtoken::Validation` already checks signature, algorithm and
    /// `exp`/`nbf` when present. This additionally requires a non-blank `user.id`.
    pub fn verify_identity(&self, token: &str) -> Result<VerifiedIdentity, AccessJwtError> {
        let claims = self.verify(token)?;

        let user_id = claims.user.id.trim();
        if user_id.is_empty() {
            return Err(AccessJwtError::EmptyClaim("user.id"));
        }

        Ok(VerifiedIdentity {
            user_id: user_id.to_string(),
        })
    }

    /// Non-secret identifier of the loaded secret (for startup logs).
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(12);
    encoded
}
