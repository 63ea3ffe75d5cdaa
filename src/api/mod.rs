//! Backend API contract: envelope, transport and typed payloads.

mod envelope;
mod payloads;
mod transport;

pub use envelope::{ApiResponse, Form};
pub use payloads::{
    CompetitionEntry, GameSnapshot, GameSummary, LoginData, NewGame, SaltData, SignupData,
    TokenLifetime, UserPage, UserStats, UserSummary, paths,
};
pub use transport::{HttpTransport, Transport};
