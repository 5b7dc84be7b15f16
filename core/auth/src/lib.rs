//! Delegated OAuth2 credential lifecycle for Inkpress.
//!
//! This crate owns everything that gates publishing:
//! - the [`Credential`] issued by the provider after a code exchange,
//! - the [`CredentialStore`] that persists the single process-wide credential,
//! - the [`AuthFlow`] driving the consent URL / code exchange / refresh steps,
//! - the [`TokenSource`] that hands out valid access tokens, refreshing
//!   transparently.

pub mod credential;
pub mod flow;
pub mod store;

pub use credential::Credential;
pub use flow::{AuthFlow, AuthStatus, OAuthConfig, TokenSource};
pub use store::CredentialStore;
