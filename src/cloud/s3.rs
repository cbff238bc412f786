//! S3 object storage client using AWS Signature Version 4.
//!
//! A deliberately small client: a single PUT per artifact, signed headers
//! only, no multipart, no retries.

use super::ObjectStore;
use crate::error::{AnalysisError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Request timeout for uploads in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SERVICE: &str = "s3";
const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-type;host;x-amz-content-sha256;x-amz-date";

type HmacSha256 = Hmac<Sha256>;

/// Destination coordinates and credentials for an S3 upload.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl S3Config {
    /// Assemble a config, rejecting any missing or empty field up front so
    /// no network call is attempted with incomplete credentials.
    pub fn from_parts(
        bucket: &str,
        region: &str,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> Result<Self> {
        let mut missing = Vec::new();
        if bucket.trim().is_empty() {
            missing.push("bucket");
        }
        if region.trim().is_empty() {
            missing.push("region");
        }
        let access_key_id = access_key_id.unwrap_or_default();
        if access_key_id.trim().is_empty() {
            missing.push("AWS_ACCESS_KEY_ID");
        }
        let secret_access_key = secret_access_key.unwrap_or_default();
        if secret_access_key.trim().is_empty() {
            missing.push("AWS_SECRET_ACCESS_KEY");
        }

        if !missing.is_empty() {
            return Err(AnalysisError::MissingCredentials(missing.join(", ")));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            region: region.to_string(),
            access_key_id,
            secret_access_key,
        })
    }
}

/// Blocking S3 client performing SigV4-signed PUTs.
pub struct S3Client {
    config: S3Config,
    client: Client,
}

impl S3Client {
    pub fn new(config: S3Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { config, client })
    }

    fn host(&self) -> String {
        format!(
            "{}.s3.{}.amazonaws.com",
            self.config.bucket, self.config.region
        )
    }
}

impl ObjectStore for S3Client {
    fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let host = self.host();
        let canonical_uri = format!("/{}", uri_encode_path(key));
        let payload_hash = sha256_hex(bytes);
        let now = Utc::now();

        let authorization = authorization_header(
            &self.config,
            &host,
            &canonical_uri,
            content_type,
            &payload_hash,
            now,
        );

        let url = format!("https://{}{}", host, canonical_uri);
        let response = self
            .client
            .put(&url)
            .header("authorization", authorization)
            .header("content-type", content_type)
            .header("x-amz-content-sha256", &payload_hash)
            .header("x-amz-date", amz_date(now))
            .body(bytes.to_vec())
            .send()
            .map_err(|e| AnalysisError::CloudExport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::CloudExport(format!(
                "S3 PUT returned {}: {}",
                status, body
            )));
        }

        Ok(format!("s3://{}/{}", self.config.bucket, key))
    }

    fn name(&self) -> &str {
        "S3"
    }
}

fn amz_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

fn authorization_header(
    config: &S3Config,
    host: &str,
    canonical_uri: &str,
    content_type: &str,
    payload_hash: &str,
    now: DateTime<Utc>,
) -> String {
    let amz_date = amz_date(now);
    let date = now.format("%Y%m%d").to_string();

    let canonical_headers = format!(
        "content-type:{}\nhost:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
        content_type, host, payload_hash, amz_date
    );
    let canonical_request = format!(
        "PUT\n{}\n\n{}\n{}\n{}",
        canonical_uri, canonical_headers, SIGNED_HEADERS, payload_hash
    );

    let scope = format!("{}/{}/{}/aws4_request", date, config.region, SERVICE);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        SIGNING_ALGORITHM,
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(&config.secret_access_key, &date, &config.region);
    let signature = hex_encode(&hmac_sha256(&key, string_to_sign.as_bytes()));

    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        SIGNING_ALGORITHM, config.access_key_id, scope, SIGNED_HEADERS, signature
    )
}

fn signing_key(secret: &str, date: &str, region: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex_encode(&Sha256::digest(data))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Percent-encode a key for the canonical URI, keeping `/` separators.
fn uri_encode_path(key: &str) -> String {
    key.split('/')
        .map(uri_encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn uri_encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}
