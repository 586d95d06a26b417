//! Content hashing for stored payloads using blake3.
//!
//! Payloads are hashed over their serialized JSON text exactly as stored.
//! Snapshots contain only `Vec` and `IndexMap` collections, so the same
//! callable state always serializes (and hashes) the same way.

/// Hex blake3 hash of a serialized payload.
pub fn payload_hash(payload: &str) -> String {
    blake3::hash(payload.as_bytes()).to_hex().to_string()
}

/// Checks a payload against its recorded hash.
pub fn verify_payload(payload: &str, expected: &str) -> bool {
    payload_hash(payload) == expected
}
