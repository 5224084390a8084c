//! Walks through one EVE Online SSO login: print the authorize URL, then (when a code is
//! supplied) exchange it and show the verified character.
//!
//! ```sh
//! ESI_CLIENT_ID=... ESI_CLIENT_SECRET=... cargo run --example eve_login
//! ESI_CLIENT_ID=... ESI_CLIENT_SECRET=... cargo run --example eve_login -- <code> <state>
//! ```

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use esi_auth::{
	oauth::TokenClient,
	provider::{ProviderConfig, ScopeDelimiter},
	strategy::{AuthorizeRequest, CallbackParams, EsiStrategy, Strategy},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ProviderConfig::from_env()?;
	let client = Arc::new(TokenClient::new(config)?);
	let redirect_uri = Url::parse("http://localhost:8080/auth/eve/callback")?;
	let mut args = env::args().skip(1);
	let mut strategy = EsiStrategy::new(client).with_failure_sink(Arc::new(
		|failure: &esi_auth::strategy::AuthFailure| {
			eprintln!("Login failed ({}): {}", failure.key, failure.message);
		},
	));

	let Some(code) = args.next() else {
		let url = strategy.begin(
			AuthorizeRequest::new(redirect_uri)
				.scopes(["publicData", "esi-skills.read_skills.v1"], ScopeDelimiter::Space)
				.state("demo-state"),
		);

		println!("Send your user to {url}.");
		println!("Re-run with the returned `code` and `state` to finish the login.");

		return Ok(());
	};
	let state = args.next().unwrap_or_else(|| "demo-state".into());

	strategy.expect_state("demo-state");

	let params = CallbackParams::from([("code".into(), code), ("state".into(), state)]);

	strategy.handle_callback(&params).await.into_result()?;

	let auth = strategy.auth()?;

	println!("Character {} ({}).", auth.info.name.as_deref().unwrap_or("?"), auth.uid);
	println!("Scopes: {}.", auth.credentials.scopes.join(", "));
	println!(
		"Token expires at {}.",
		auth.credentials
			.expires_at
			.map(|at| at.to_string())
			.ok_or_else(|| eyre!("Token should carry an expiry."))?
	);

	strategy.cleanup();

	Ok(())
}
