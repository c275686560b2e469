//! API-key authentication.
//!
//! Every `/api` endpoint requires an `X-API-Key` header. Keys are never
//! stored in clear: the realm record carries the SHA-256 hex digest and
//! lookup happens against that digest.

use actix_web::{HttpRequest, HttpResponse};
use sha2::{Digest, Sha256};
use tracing::{error, warn};

use cv_core::domain::entities::Realm;
use cv_core::repositories::RealmRepository;

use crate::dto::error;

const API_KEY_HEADER: &str = "X-API-Key";

/// SHA-256 hex digest of an API key
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(digest)
}

/// Resolve the calling realm from the request's API key header
///
/// Returns the ready-to-send error response on failure so handlers can
/// short-circuit with `?`-free match arms.
pub async fn resolve_realm<R>(req: &HttpRequest, realms: &R) -> Result<Realm, HttpResponse>
where
    R: RealmRepository,
{
    let key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let key = match key {
        Some(key) => key,
        None => {
            warn!(path = %req.path(), "request without API key");
            return Err(error::unauthorized());
        }
    };

    match realms.find_by_api_key_hash(&hash_api_key(key)).await {
        Ok(Some(realm)) => Ok(realm),
        Ok(None) => {
            warn!(path = %req.path(), "request with unknown API key");
            Err(error::unauthorized())
        }
        Err(err) => {
            error!(error = %err, "realm lookup failed");
            Err(error::internal())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_api_key_is_sha256_hex() {
        // echo -n "test-key" | sha256sum
        assert_eq!(
            hash_api_key("test-key"),
            "62af8704764faf8ea82fc61ce9c4c3908b6cb97d463a634e9e587d7c885db0ef"
        );
    }

    #[test]
    fn test_hash_differs_per_key() {
        assert_ne!(hash_api_key("a"), hash_api_key("b"));
        assert_eq!(hash_api_key("a"), hash_api_key("a"));
    }
}
