use kube_derive::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TargetImport;

/// Deployment destination, usually credentials of a remote cluster
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[kube(
	group = "landscaper.gardener.cloud",
	version = "v1alpha1",
	kind = "Target",
	namespaced,
	schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
	#[serde(rename = "type")]
	pub type_: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub config: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret_ref: Option<LocalSecretReference>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSecretReference {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}

/// Target bound to the import that requested it. Built fresh on every pass
#[derive(Clone, Debug)]
pub struct TargetExtension {
	pub target: Target,
	pub import: TargetImport,
}

impl TargetExtension {
	pub fn new(target: Target, import: &TargetImport) -> Self {
		Self {
			target,
			import: import.clone(),
		}
	}

	pub fn name(&self) -> &str {
		self.target.metadata.name.as_deref().unwrap_or_default()
	}

	pub fn generation(&self) -> i64 {
		self.target.metadata.generation.unwrap_or_default()
	}
}

#[derive(Clone, Debug, Default)]
pub struct TargetExtensionList(pub Vec<TargetExtension>);

impl TargetExtensionList {
	pub fn new(targets: Vec<Target>, import: &TargetImport) -> Self {
		Self(
			targets
				.into_iter()
				.map(|target| TargetExtension::new(target, import))
				.collect(),
		)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_inner(self) -> Vec<TargetExtension> {
		self.0
	}
}
