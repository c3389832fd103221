//! Token generation and prefix extraction.
//!
//! A token is a 256-bit CSPRNG value. Its on-disk identity is a short hash
//! prefix (the `id`); the full token is shown to the user exactly once
//! and never persisted.

use rand::RngCore;
use sha2::{Digest, Sha256};

pub const ID_LEN: usize = 8;
const TOKEN_PREFIX: &str = "agt_";

/// Generates a fresh token. Returns `(full_token, id)`; only `id` should
/// ever be written to disk.
pub fn generate_token() -> (String, String) {
    let mut raw = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut raw);
    let body = hex::encode(raw);
    let id = id_for_body(&body);
    (format!("{TOKEN_PREFIX}{id}{body}"), id)
}

fn id_for_body(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    hex::encode(digest)[..ID_LEN].to_string()
}

/// Extracts the `id` prefix from a presented token without validating it
/// against any stored credential. Returns `None` if the token is too
/// short or missing the `agt_` prefix.
pub fn extract_id(token: &str) -> Option<&str> {
    let body = token.strip_prefix(TOKEN_PREFIX)?;
    if body.len() < ID_LEN {
        return None;
    }
    Some(&body[..ID_LEN])
}

/// The body used for wrapping-key derivation: everything after the `id`.
/// Two different CSPRNG draws collide here with negligible probability,
/// so deriving the wrapping key from this alone (plus a stored salt) is
/// safe.
pub fn wrapping_material(token: &str) -> Option<&str> {
    let body = token.strip_prefix(TOKEN_PREFIX)?;
    body.get(ID_LEN..)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_round_trips_its_id() {
        let (token, id) = generate_token();
        assert!(token.starts_with(TOKEN_PREFIX));
        assert_eq!(extract_id(&token).unwrap(), id);
    }

    #[test]
    fn tokens_are_unique() {
        let (a, _) = generate_token();
        let (b, _) = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn extract_id_rejects_bad_prefix() {
        assert!(extract_id("notanagenttoken").is_none());
    }

    #[test]
    fn wrapping_material_excludes_id() {
        let (token, _id) = generate_token();
        let material = wrapping_material(&token).unwrap();
        assert_eq!(material.len(), 64 - ID_LEN);
    }
}
