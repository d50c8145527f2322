use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

pub fn hash_password(plaintext: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

const MACHINE_PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// High-entropy password suitable as a machine credential (spec §4.1).
/// 40 characters over a 62-symbol alphabet is ~238 bits of entropy.
pub fn generate_machine_password() -> String {
    let mut rng = rand::rngs::OsRng;
    (0..40)
        .map(|_| {
            let idx = (rng.next_u32() as usize) % MACHINE_PASSWORD_ALPHABET.len();
            MACHINE_PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn generated_passwords_are_unique_and_full_length() {
        let a = generate_machine_password();
        let b = generate_machine_password();
        assert_eq!(a.len(), 40);
        assert_ne!(a, b);
    }
}
