//! AWS Signature Version 4 for the room-account API.
//!
//! The front-office API sits behind an API gateway that authenticates
//! callers with SigV4. Only what the till sends is covered: a single path,
//! no query string, and optionally a `Content-Type` header.
//!
//! ```text
//! canonical request ──sha256──► string to sign ──hmac(signing key)──► signature
//!                                                     ▲
//!       "AWS4"+secret ─► date ─► region ─► service ─► "aws4_request"
//! ```

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// The key material was rejected by the MAC.
#[derive(Debug, Error)]
#[error("Invalid signing key: {0}")]
pub struct SigningError(String);

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signs requests for one host/region/service with one key pair.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    access_key: String,
    secret_key: String,
    region: String,
    service: String,
    host: String,
}

impl RequestSigner {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
        service: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: region.into(),
            service: service.into(),
            host: host.into(),
        }
    }

    /// Headers to add to the request: `X-Amz-Date`, `Authorization`, and
    /// `Content-Type` when given. `Host` is signed but not returned; the
    /// HTTP client sets it.
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        content_type: Option<&str>,
        body: &[u8],
        at: DateTime<Utc>,
    ) -> Result<Vec<(&'static str, String)>, SigningError> {
        let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
        let date = at.format("%Y%m%d").to_string();

        let mut canonical_headers = String::new();
        let mut signed_headers = Vec::new();
        if let Some(content_type) = content_type {
            canonical_headers.push_str(&format!("content-type:{}\n", content_type.trim()));
            signed_headers.push("content-type");
        }
        canonical_headers.push_str(&format!("host:{}\n", self.host.trim()));
        signed_headers.push("host");
        canonical_headers.push_str(&format!("x-amz-date:{}\n", amz_date));
        signed_headers.push("x-amz-date");
        let signed_headers = signed_headers.join(";");

        let payload_hash = hex::encode(Sha256::digest(body));
        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method, path, canonical_headers, signed_headers, payload_hash
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(&self.secret_key, &date, &self.region, &self.service)?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key, scope, signed_headers, signature
        );

        let mut headers = Vec::with_capacity(3);
        if let Some(content_type) = content_type {
            headers.push(("Content-Type", content_type.to_string()));
        }
        headers.push(("X-Amz-Date", amz_date));
        headers.push(("Authorization", authorization));
        Ok(headers)
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SigningError(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}
