//! Issued token model and builder.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::Secret};

/// Errors produced by [`TokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the token type was not provided.
	#[error("Token type is required.")]
	MissingTokenType,
	/// Issued when the lifetime pushes the expiry past the representable range.
	#[error("Token lifetime is out of range.")]
	ExpiryOutOfRange,
}

/// Access token issued by the code exchange.
///
/// The expiry is stored as an absolute instant computed when the token response was
/// received; providers that omit `expires_in` produce a non-expiring token.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<Secret>,
	/// Token type reported by the provider (normally `bearer`).
	pub token_type: String,
	/// Instant the token response was received.
	#[serde(with = "time::serde::timestamp")]
	pub issued_at: OffsetDateTime,
	/// Absolute expiry instant, when the provider supplied a lifetime.
	#[serde(with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes granted by the token endpoint, in provider order.
	pub scopes: Vec<String>,
	/// Token response fields not modeled above.
	pub raw_provider_fields: Map<String, Value>,
}
impl Token {
	/// Returns a builder for assembling a token.
	pub fn builder() -> TokenBuilder {
		TokenBuilder::default()
	}

	/// Returns true when the token carries an expiry instant.
	pub fn expires(&self) -> bool {
		self.expires_at.is_some()
	}

	/// Returns true if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns true if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("scopes", &self.scopes)
			.field("raw_provider_fields", &self.raw_provider_fields.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`Token`].
#[derive(Clone, Debug, Default)]
pub struct TokenBuilder {
	access_token: Option<Secret>,
	refresh_token: Option<Secret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	scopes: Vec<String>,
	raw_provider_fields: Map<String, Value>,
}
impl TokenBuilder {
	/// Sets the access token secret.
	pub fn access_token(mut self, token: impl Into<Secret>) -> Self {
		self.access_token = Some(token.into());

		self
	}

	/// Sets the refresh token secret.
	pub fn refresh_token(mut self, token: impl Into<Secret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Sets the token type.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the issued-at instant (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant; takes precedence over [`Self::expires_in`].
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative lifetime measured from the issued-at instant.
	pub fn expires_in(mut self, lifetime: Duration) -> Self {
		self.expires_in = Some(lifetime);

		self
	}

	/// Sets the granted scopes, preserving order.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Sets the passthrough provider fields.
	pub fn raw_provider_fields(mut self, fields: Map<String, Value>) -> Self {
		self.raw_provider_fields = fields;

		self
	}

	/// Consumes the builder and validates the resulting token.
	pub fn build(self) -> Result<Token, TokenBuilderError> {
		let access_token = self.access_token.ok_or(TokenBuilderError::MissingAccessToken)?;

		if access_token.is_empty() {
			return Err(TokenBuilderError::MissingAccessToken);
		}

		let token_type = self.token_type.ok_or(TokenBuilderError::MissingTokenType)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => Some(instant),
			(None, Some(lifetime)) => Some(
				issued_at.checked_add(lifetime).ok_or(TokenBuilderError::ExpiryOutOfRange)?,
			),
			(None, None) => None,
		};

		Ok(Token {
			access_token,
			refresh_token: self.refresh_token,
			token_type,
			issued_at,
			expires_at,
			scopes: self.scopes,
			raw_provider_fields: self.raw_provider_fields,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn expires_in_becomes_absolute_expiry() {
		let issued_at = datetime!(2025-01-01 00:00 UTC);
		let token = Token::builder()
			.access_token("access")
			.token_type("bearer")
			.issued_at(issued_at)
			.expires_in(Duration::seconds(1199))
			.build()
			.expect("Token should build.");

		assert!(token.expires());
		assert_eq!(token.expires_at, Some(datetime!(2025-01-01 00:19:59 UTC)));
		assert!(!token.is_expired_at(datetime!(2025-01-01 00:10 UTC)));
		assert!(token.is_expired_at(datetime!(2025-01-01 00:20 UTC)));
	}

	#[test]
	fn oversized_lifetime_is_rejected() {
		let err = Token::builder()
			.access_token("access")
			.token_type("bearer")
			.issued_at(datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(1_000_000_000_000))
			.build()
			.expect_err("Expiry beyond the supported range should fail.");

		assert_eq!(err, TokenBuilderError::ExpiryOutOfRange);
	}

	#[test]
	fn token_without_lifetime_never_expires() {
		let token = Token::builder()
			.access_token("access")
			.token_type("bearer")
			.build()
			.expect("Token should build.");

		assert!(!token.expires());
		assert!(!token.is_expired());
	}

	#[test]
	fn builder_rejects_missing_access_token() {
		let err = Token::builder().token_type("bearer").build().expect_err("Builder should fail.");

		assert_eq!(err, TokenBuilderError::MissingAccessToken);

		let err = Token::builder()
			.access_token("")
			.token_type("bearer")
			.build()
			.expect_err("Empty access tokens should be rejected.");

		assert_eq!(err, TokenBuilderError::MissingAccessToken);
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let token = Token::builder()
			.access_token("very-secret")
			.refresh_token("also-secret")
			.token_type("bearer")
			.build()
			.expect("Token should build.");
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("very-secret"));
		assert!(!rendered.contains("also-secret"));
	}
}
