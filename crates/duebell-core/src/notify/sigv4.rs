//! Minimal AWS Signature Version 4 request signing.
//!
//! Only what the SES call needs: POST with a JSON payload and a fixed,
//! small header set. Header names are lowercased and sorted into the
//! canonical form; the payload hash is always computed (no UNSIGNED-PAYLOAD).

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Static inputs for one signature.
pub struct SigningParams<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    /// `YYYYMMDDTHHMMSSZ`
    pub amz_date: &'a str,
}

impl SigningParams<'_> {
    fn date_stamp(&self) -> &str {
        &self.amz_date[..8]
    }

    fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/aws4_request",
            self.date_stamp(),
            self.region,
            self.service
        )
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(key).expect("hmac accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Derive the per-day signing key: HMAC chain over date, region,
/// service, and the literal `aws4_request`.
fn signing_key(params: &SigningParams<'_>) -> Vec<u8> {
    let k_date = hmac_sha256(
        format!("AWS4{}", params.secret_key).as_bytes(),
        params.date_stamp().as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, params.region.as_bytes());
    let k_service = hmac_sha256(&k_region, params.service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// Canonical headers in `name:value\n` form plus the signed-headers list.
/// Names are lowercased, values trimmed, entries sorted by name.
fn canonical_headers(headers: &[(&str, &str)]) -> (String, String) {
    let mut entries: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    entries.sort();

    let canonical = entries
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect::<String>();
    let signed = entries
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (canonical, signed)
}

/// Compute the `Authorization` header value for one request.
pub fn authorization_header(
    params: &SigningParams<'_>,
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    headers: &[(&str, &str)],
    payload: &[u8],
) -> String {
    let (canonical_hdrs, signed_headers) = canonical_headers(headers);
    let canonical_request = format!(
        "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_hdrs}\n{signed_headers}\n{}",
        sha256_hex(payload)
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{}\n{}\n{}",
        params.amz_date,
        params.credential_scope(),
        sha256_hex(canonical_request.as_bytes())
    );

    let signature = hex::encode(hmac_sha256(&signing_key(params), string_to_sign.as_bytes()));

    format!(
        "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
        params.access_key,
        params.credential_scope(),
        signed_headers,
        signature
    )
}
