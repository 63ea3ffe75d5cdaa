//! Authentication: request strategy, credentials and key derivation.

mod authenticator;
mod credentials;
mod key;

pub use authenticator::{AuthenticatedRequest, Authenticator};
pub use credentials::{
    CredentialStorage, Credentials, FileStorage, IN_COMPETITION_KEY, MemoryStorage,
    TOKEN_EXPIRATION_KEY, TOKEN_KEY, USERNAME_KEY,
};
pub use key::{Blake3Deriver, KeyDeriver, SALT_LEN, generate_salt};
