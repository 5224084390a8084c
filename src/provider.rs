//! Provider configuration (data) shared read-only by every login.
//!
//! `config` exposes [`ProviderConfig`] with the EVE Online SSO endpoints, the uid/name
//! field selectors, and the deployment toggles (scope delimiter, redirect URI
//! suppression, identity credential placement). `builder` validates assembled values and
//! `env` loads them from process environment variables.

pub mod builder;
pub mod config;
pub mod env;

pub use builder::*;
pub use config::*;
