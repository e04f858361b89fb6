//! Authentication: signed session tokens, the credential allow-list and the
//! auth gate that protects every browsing route.
//!
//! ## Flow
//!
//! 1. `POST /login` checks the credentials, canonicalizes the requested root
//!    and issues a token binding both ([`login::authenticate`]).
//! 2. The token travels in the `access_token` cookie.
//! 3. [`session::require_session`] validates it on every protected request
//!    and attaches the [`Session`] to the request extensions; any failure
//!    becomes a redirect to `/login`.

pub mod login;
pub mod session;
mod state;
pub mod token;

pub use login::LoginError;
pub use state::{AuthConfig, AuthState, Credential, CredentialStore};
pub use token::{AuthError, Session, TokenCodec, DEFAULT_TTL};
