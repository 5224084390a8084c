//! Host-facing views over a completed login.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{Identity, Secret, Token},
	provider::ProviderConfig,
};

const EMAIL_FIELDS: &[&str] = &["email", "Email"];
const LOCATION_FIELDS: &[&str] = &["location", "Location"];
const DESCRIPTION_FIELDS: &[&str] = &["description", "bio"];
const IMAGE_FIELDS: &[&str] = &["image", "avatar_url", "portrait_url"];
const PROFILE_URL_FIELDS: &[&str] = &["profile_url", "html_url", "url"];

/// Normalized credentials.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
	/// Access token.
	pub token: Secret,
	/// Refresh token, when issued.
	pub refresh_token: Option<Secret>,
	/// Token type (normally `bearer`).
	pub token_type: String,
	/// Whether the token has an expiry.
	pub expires: bool,
	/// Absolute expiry instant.
	#[serde(with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes granted to the character.
	pub scopes: Vec<String>,
	/// Token response fields without a dedicated slot.
	pub other: Map<String, Value>,
}
impl Credentials {
	pub(crate) fn from_parts(config: &ProviderConfig, token: &Token, identity: &Identity) -> Self {
		let scopes = match identity.get_string(&config.scopes_field) {
			Some(raw) => config.scope_delimiter.split(&raw),
			None => token.scopes.clone(),
		};

		Self {
			token: token.access_token.clone(),
			refresh_token: token.refresh_token.clone(),
			token_type: token.token_type.clone(),
			expires: token.expires(),
			expires_at: token.expires_at,
			scopes,
			other: token.raw_provider_fields.clone(),
		}
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("token", &self.token)
			.field("refresh_token", &self.refresh_token)
			.field("token_type", &self.token_type)
			.field("expires", &self.expires)
			.field("expires_at", &self.expires_at)
			.field("scopes", &self.scopes)
			.field("other", &self.other.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Normalized profile info.
///
/// EVE characters only carry a name; the remaining slots are filled when the identity
/// document happens to contain a matching field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
	/// Display name.
	pub name: Option<String>,
	/// Email address.
	pub email: Option<String>,
	/// Location.
	pub location: Option<String>,
	/// Free-form description.
	pub description: Option<String>,
	/// Portrait or avatar URL.
	pub image: Option<String>,
	/// Named profile links.
	pub urls: BTreeMap<String, String>,
}
impl Info {
	pub(crate) fn from_identity(config: &ProviderConfig, identity: &Identity) -> Self {
		let mut urls = BTreeMap::new();

		if let Some(profile) = identity.first_string(PROFILE_URL_FIELDS) {
			urls.insert("profile".to_owned(), profile);
		}

		Self {
			name: identity.get_string(&config.name_field),
			email: identity.first_string(EMAIL_FIELDS),
			location: identity.first_string(LOCATION_FIELDS),
			description: identity.first_string(DESCRIPTION_FIELDS),
			image: identity.first_string(IMAGE_FIELDS),
			urls,
		}
	}
}

/// Raw provider data preserved for the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extra {
	/// Token exactly as issued.
	pub token: Token,
	/// Identity document exactly as returned by the verification endpoint.
	pub identity: Identity,
}

/// Everything a completed login produces, bundled for hosts that want one value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Auth {
	/// Provider label (`esi`).
	pub provider: String,
	/// Unique character identifier.
	pub uid: String,
	/// Normalized credentials.
	pub credentials: Credentials,
	/// Normalized profile info.
	pub info: Info,
	/// Raw provider data.
	pub extra: Extra,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::provider::ScopeDelimiter;

	fn config(delimiter: ScopeDelimiter) -> ProviderConfig {
		ProviderConfig::builder("id", "secret")
			.scope_delimiter(delimiter)
			.build()
			.expect("Configuration should build.")
	}

	fn token(scopes: &[&str]) -> Token {
		Token::builder()
			.access_token("a")
			.token_type("bearer")
			.scopes(scopes.iter().copied())
			.build()
			.expect("Token should build.")
	}

	fn identity(value: Value) -> Identity {
		Identity::try_from(value).expect("Fixture should be a JSON object.")
	}

	#[test]
	fn credentials_split_identity_scopes_with_configured_delimiter() {
		let identity = identity(json!({ "Scopes": "a b" }));
		let comma = Credentials::from_parts(&config(ScopeDelimiter::Comma), &token(&[]), &identity);
		let space = Credentials::from_parts(&config(ScopeDelimiter::Space), &token(&[]), &identity);

		assert_eq!(comma.scopes, vec!["a b"]);
		assert_eq!(space.scopes, vec!["a", "b"]);
	}

	#[test]
	fn credentials_fall_back_to_token_scopes() {
		let credentials = Credentials::from_parts(
			&config(ScopeDelimiter::Comma),
			&token(&["x", "y"]),
			&identity(json!({ "CharacterID": 1 })),
		);

		assert_eq!(credentials.scopes, vec!["x", "y"]);
		assert!(!credentials.expires);
		assert!(!format!("{credentials:?}").contains("\"a\""));
	}

	#[test]
	fn empty_scope_string_is_kept_as_single_entry() {
		let credentials = Credentials::from_parts(
			&config(ScopeDelimiter::Comma),
			&token(&[]),
			&identity(json!({ "Scopes": "" })),
		);

		assert_eq!(credentials.scopes, vec![String::new()]);
	}

	#[test]
	fn info_maps_name_and_optional_fields() {
		let info = Info::from_identity(
			&config(ScopeDelimiter::Comma),
			&identity(json!({
				"CharacterName": "Foo",
				"portrait_url": "https://images.example.com/1.jpg",
				"html_url": "https://zkillboard.com/character/1/",
			})),
		);

		assert_eq!(info.name.as_deref(), Some("Foo"));
		assert_eq!(info.image.as_deref(), Some("https://images.example.com/1.jpg"));
		assert_eq!(
			info.urls.get("profile").map(String::as_str),
			Some("https://zkillboard.com/character/1/")
		);
		assert!(info.email.is_none());
	}
}
