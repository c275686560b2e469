//! ES256 token signing.
//!
//! Verification tokens are asymmetric JWTs so downstream certificate
//! issuers can validate them with the published public key. The `kid`
//! header names the active key and makes rotation a config change.

use std::path::Path;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::errors::SigningError;

/// Claims carried by a verification token JWT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer, from deployment config
    pub iss: String,
    /// Audience, from deployment config
    pub aud: String,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Token id, unique per redemption
    pub jti: String,
    /// Opaque subject, `testtype.symptomdate.testdate`
    pub sub: String,
}

/// Signs verification token claims into a compact JWT
pub trait TokenSigner: Send + Sync {
    /// Sign `claims`, returning the compact JWT string
    fn sign(&self, claims: &TokenClaims) -> Result<String, SigningError>;

    /// Identifier of the signing key, emitted as the JWT `kid` header
    fn key_id(&self) -> &str;
}

/// ES256 signer over a PEM-encoded P-256 private key
pub struct Es256Signer {
    key_id: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for Es256Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Es256Signer")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl Es256Signer {
    /// Build a signer from PEM bytes
    pub fn from_pem(key_id: impl Into<String>, pem: &[u8]) -> Result<Self, SigningError> {
        let encoding_key =
            EncodingKey::from_ec_pem(pem).map_err(|e| SigningError::KeyUnavailable {
                message: e.to_string(),
            })?;
        Ok(Self {
            key_id: key_id.into(),
            encoding_key,
        })
    }

    /// Build a signer by reading a PEM file
    pub fn from_pem_file(
        key_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, SigningError> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|e| SigningError::KeyUnavailable {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_pem(key_id, &pem)
    }
}

impl TokenSigner for Es256Signer {
    fn sign(&self, claims: &TokenClaims) -> Result<String, SigningError> {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            SigningError::Signing {
                message: e.to_string(),
            }
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}
