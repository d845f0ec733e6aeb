use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Location a component descriptor (and its dependencies) is fetched from
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryContext {
	#[serde(rename = "type")]
	pub type_: String,
	pub base_url: String,
}

impl RepositoryContext {
	pub fn oci(base_url: impl Into<String>) -> Self {
		Self {
			type_: "ociRegistry".to_owned(),
			base_url: base_url.into(),
		}
	}
}

impl Display for RepositoryContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.type_, self.base_url)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentReference {
	pub name: String,
	pub version: String,
}

impl ComponentReference {
	pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			version: version.into(),
		}
	}
}

impl Display for ComponentReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.name, self.version)
	}
}

/// Fetched component descriptor, never modified afterwards
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
	pub name: String,
	pub version: String,
	#[serde(default)]
	pub repository_contexts: Vec<RepositoryContext>,
	#[serde(default)]
	pub component_references: Vec<ComponentReference>,
}

impl ComponentDescriptor {
	/// The last recorded repository context governs resolution of references
	pub fn effective_repository_context(&self) -> Option<&RepositoryContext> {
		self.repository_contexts.last()
	}

	pub fn reference(&self) -> ComponentReference {
		ComponentReference::new(self.name.as_str(), self.version.as_str())
	}
}

/// Root descriptor followed by every transitively referenced one, in discovery order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EffectiveComponentDescriptorList {
	pub components: Vec<ComponentDescriptor>,
}

impl EffectiveComponentDescriptorList {
	pub fn root(&self) -> Option<&ComponentDescriptor> {
		self.components.first()
	}

	pub fn get(&self, name: &str, version: &str) -> Option<&ComponentDescriptor> {
		self.components
			.iter()
			.find(|cd| cd.name == name && cd.version == version)
	}

	pub fn len(&self) -> usize {
		self.components.len()
	}

	pub fn is_empty(&self) -> bool {
		self.components.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
		self.components.iter()
	}
}
