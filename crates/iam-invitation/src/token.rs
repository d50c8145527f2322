use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Mints an opaque acceptance token with 128 bits of CSPRNG entropy
/// (spec §4.6), returning `(plaintext, hash)`. Only the hash is persisted;
/// the plaintext is handed to the caller for the one-time acceptance URL.
pub fn generate_invite_token() -> (String, String) {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    let plaintext = URL_SAFE_NO_PAD.encode(bytes);
    (plaintext.clone(), hash_token(&plaintext))
}

pub fn hash_token(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}
