//! Internet Computer identity for the wallet panel
//!
//! - `Principal`: account identifiers and their text form
//! - `Ed25519KeyIdentity`: a key-backed identity (DER key, principal)
//! - `DelegationChain` / `DelegationIdentity`: provider-issued sessions
//! - `AuthClient`: login/logout over an `IdentityProvider`

pub mod auth_client;
pub mod delegation;
pub mod error;
pub mod identity;
pub mod principal;

// Re-exports
pub use auth_client::{
    AuthClient, Authorization, AuthorizeRequest, DEFAULT_MAX_TIME_TO_LIVE,
    DelegationFileProvider, IdentityProvider,
};
pub use delegation::{Delegation, DelegationChain, DelegationIdentity, SignedDelegation, now_nanos};
pub use error::{IdentityError, IdentityResult};
pub use identity::{Ed25519KeyIdentity, der_decode_ed25519, der_encode_ed25519};
pub use principal::Principal;
