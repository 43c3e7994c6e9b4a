use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256, the format the Web Monitoring database uses for
/// `body_hash`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Labelled digest for `WARC-Block-Digest`/`WARC-Payload-Digest` headers.
pub fn warc_digest(data: &[u8]) -> String {
    format!("sha256:{}", sha256_hex(data))
}
