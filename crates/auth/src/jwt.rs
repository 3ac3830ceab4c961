//! HS256 bearer tokens as an [`IdentitySource`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;
use tracing::debug;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};
use crate::identity::{AuthRequest, Identity, IdentitySource};
use crate::membership::LookupError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or badly signed token: {0}")]
    Decode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies HS256 tokens carrying [`JwtClaims`].
///
/// Expiry is checked against our own `issued_at`/`expires_at` claims, so the
/// registered `exp` claim is not required.
pub struct Hs256IdentitySource {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256IdentitySource {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenError::Decode(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[async_trait]
impl IdentitySource for Hs256IdentitySource {
    async fn resolve_identity(&self, request: &AuthRequest) -> Result<Option<Identity>, LookupError> {
        let Some(token) = request.bearer_token() else {
            return Ok(None);
        };

        match self.verify(token, Utc::now()) {
            Ok(claims) => Ok(Some(Identity {
                user_id: claims.sub,
                tenant_id: claims.tenant_id,
            })),
            Err(err) => {
                debug!(error = %err, "bearer token rejected");
                Ok(None)
            }
        }
    }
}
