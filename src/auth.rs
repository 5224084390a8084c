//! Auth-domain models: redacted secrets, issued tokens, verified identities, and client
//! credential overrides.

pub mod client;
pub mod identity;
pub mod secret;
pub mod token;

pub use client::*;
pub use identity::*;
pub use secret::*;
pub use token::*;
