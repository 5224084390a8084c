//! Verified character identity returned by the verification endpoint.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Opaque key-value identity document.
///
/// Only a unique identifier and a display name are expected; every other field is
/// passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Map<String, Value>);
impl Identity {
	/// Wraps an already-parsed JSON object.
	pub fn new(fields: Map<String, Value>) -> Self {
		Self(fields)
	}

	/// Returns the raw value stored under `field`.
	pub fn get(&self, field: &str) -> Option<&Value> {
		self.0.get(field)
	}

	/// Returns the string form of a scalar field.
	///
	/// Strings are returned verbatim; numbers and booleans use their JSON text. Nulls,
	/// arrays, and objects yield `None`.
	pub fn get_string(&self, field: &str) -> Option<String> {
		match self.0.get(field)? {
			Value::String(value) => Some(value.clone()),
			Value::Number(value) => Some(value.to_string()),
			Value::Bool(value) => Some(value.to_string()),
			_ => None,
		}
	}

	/// Returns the first non-empty string among the candidate fields.
	pub fn first_string(&self, fields: &[&str]) -> Option<String> {
		fields.iter().filter_map(|field| self.get_string(field)).find(|value| !value.is_empty())
	}

	/// Borrows the underlying map.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Consumes the identity and returns the underlying map.
	pub fn into_inner(self) -> Map<String, Value> {
		self.0
	}
}
impl From<Map<String, Value>> for Identity {
	fn from(fields: Map<String, Value>) -> Self {
		Self(fields)
	}
}
impl TryFrom<Value> for Identity {
	type Error = Value;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(fields) => Ok(Self(fields)),
			other => Err(other),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn identity(value: Value) -> Identity {
		Identity::try_from(value).expect("Fixture should be a JSON object.")
	}

	#[test]
	fn scalar_fields_coerce_to_strings() {
		let identity = identity(json!({
			"CharacterID": 95465499,
			"CharacterName": "CCP Bartender",
			"Verified": true,
			"Portrait": null,
		}));

		assert_eq!(identity.get_string("CharacterID").as_deref(), Some("95465499"));
		assert_eq!(identity.get_string("CharacterName").as_deref(), Some("CCP Bartender"));
		assert_eq!(identity.get_string("Verified").as_deref(), Some("true"));
		assert_eq!(identity.get_string("Portrait"), None);
		assert_eq!(identity.get_string("Missing"), None);
	}

	#[test]
	fn first_string_skips_empty_candidates() {
		let identity = identity(json!({ "email": "", "Email": "pilot@example.com" }));

		assert_eq!(
			identity.first_string(&["email", "Email"]).as_deref(),
			Some("pilot@example.com")
		);
	}

	#[test]
	fn non_objects_are_rejected() {
		assert!(Identity::try_from(json!(["CharacterID"])).is_err());
	}
}
