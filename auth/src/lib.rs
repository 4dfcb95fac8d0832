//! Credential handling and session authentication.
//!
//! Exchanges the four broker secrets plus a freshly computed TOTP code for
//! a session handle. Exactly one attempt per call; a rejected login is
//! returned as a failed `Session`, never retried automatically.

pub mod credentials;
pub mod session;
pub mod totp;

pub use credentials::Credentials;
pub use session::{Session, SessionAuthenticator, SessionState, SessionTokens};
pub use totp::generate_totp;
