// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Opaque identifier generation for session tokens and inventory records.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use uuid::Uuid;

/// Session token size in bytes (32 bytes = 256 bits of entropy)
const SESSION_TOKEN_BYTES: usize = 32;

/// Generate a session token from CSPRNG output, base64 URL-safe encoded
/// without padding. Collisions are not checked for; at 256 bits of entropy
/// they do not occur in practice.
pub fn generate_session_token() -> String {
    let mut buffer = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Generate an id for a stored record (asset, category, site)
pub fn generate_record_id() -> String {
    Uuid::new_v4().to_string()
}
