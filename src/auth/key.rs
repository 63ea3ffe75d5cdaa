//! Password key derivation for the login and signup flows.

use rand::RngCore;
use tracing::instrument;

/// Length of a freshly generated salt, in bytes.
pub const SALT_LEN: usize = 128;

/// Turns a password and a hex salt into the key sent to the server.
///
/// The server stores whatever key signup sends and compares it on login, so
/// any deterministic derivation works as long as every client agrees.
pub trait KeyDeriver: Send + Sync + std::fmt::Debug {
    /// Derives the hex encoded key.
    fn derive(&self, password: &str, salt_hex: &str) -> String;
}

/// [`KeyDeriver`] based on BLAKE3 key derivation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Deriver;

const CONTEXT: &str = "tictactoe_webapp 2022-04 password key";

impl KeyDeriver for Blake3Deriver {
    #[instrument(skip_all)]
    fn derive(&self, password: &str, salt_hex: &str) -> String {
        let mut material = Vec::with_capacity(salt_hex.len() + password.len());
        material.extend_from_slice(salt_hex.as_bytes());
        material.extend_from_slice(password.as_bytes());
        hex::encode(blake3::derive_key(CONTEXT, &material))
    }
}

/// Generates a random hex encoded salt.
#[instrument]
pub fn generate_salt() -> String {
    let mut bytes = vec![0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic_and_salted() {
        let deriver = Blake3Deriver;
        let a = deriver.derive("hunter2", "00ff");
        assert_eq!(a, deriver.derive("hunter2", "00ff"));
        assert_ne!(a, deriver.derive("hunter2", "00fe"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_salt_shape() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_ne!(salt, generate_salt());
    }
}
