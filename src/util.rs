use serde::de::DeserializeOwned;
use serde_yaml_with_quirks::DeserializingQuirks;

use crate::{Error, Result};

/// Parse first document of a yaml file, `origin` is only used for error messages
pub fn from_yaml<T: DeserializeOwned>(contents: &str, origin: &str) -> Result<T> {
	let invalid = |message: String| Error::InvalidData {
		origin: origin.to_owned(),
		message,
	};
	let document = serde_yaml_with_quirks::Deserializer::from_str_with_quirks(
		contents,
		DeserializingQuirks { old_octals: true },
	)
	.next()
	.ok_or_else(|| invalid("empty document".to_owned()))?;
	T::deserialize(document).map_err(|e| invalid(e.to_string()))
}

/// Opaque payload bytes must hold json
pub fn json_payload(bytes: &[u8], origin: &str) -> Result<serde_json::Value> {
	serde_json::from_slice(bytes).map_err(|e| Error::InvalidData {
		origin: origin.to_owned(),
		message: e.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::ComponentDescriptor;

	#[test]
	fn yaml_first_document() {
		let cd: ComponentDescriptor = from_yaml(
			"name: example.com/a\nversion: v1.0.0\ncomponentReferences:\n- name: example.com/b\n  version: v0.1.0\n---\nname: ignored\nversion: v0\n",
			"test",
		)
		.unwrap();
		assert_eq!(cd.name, "example.com/a");
		assert_eq!(cd.component_references.len(), 1);
	}

	#[test]
	fn yaml_errors() {
		assert!(matches!(
			from_yaml::<ComponentDescriptor>("", "empty.yaml"),
			Err(Error::InvalidData { .. })
		));
		assert!(matches!(
			from_yaml::<ComponentDescriptor>("version: [", "broken.yaml"),
			Err(Error::InvalidData { origin, .. }) if origin == "broken.yaml"
		));
	}

	#[test]
	fn json() {
		assert_eq!(
			json_payload(br#"{"a":1}"#, "x").unwrap(),
			serde_json::json!({ "a": 1 })
		);
		assert!(json_payload(b"not json", "x").is_err());
	}
}
