use std::fmt::{self, Display};

use duplicate::duplicate_item;
use kube_derive::CustomResource;
use serde::{Deserialize, Serialize};

use super::{ComponentDescriptor, ComponentReference, RepositoryContext};
use crate::{Error, Result};

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[kube(
	group = "landscaper.gardener.cloud",
	version = "v1alpha1",
	kind = "Installation",
	namespaced,
	status = "InstallationStatus",
	schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct InstallationSpec {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub component_descriptor: Option<ComponentDescriptorDefinition>,
	#[serde(default)]
	pub blueprint: BlueprintDefinition,
	#[serde(default)]
	pub imports: ImportDefinitions,
}

/// Either an inline descriptor or a reference to a remote one
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptorDefinition {
	#[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
	pub reference: Option<ComponentDescriptorReference>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub inline: Option<ComponentDescriptor>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptorReference {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repository_context: Option<RepositoryContext>,
	pub component_name: String,
	pub version: String,
}

impl ComponentDescriptorReference {
	pub fn component(&self) -> ComponentReference {
		ComponentReference::new(self.component_name.as_str(), self.version.as_str())
	}
}

impl ComponentDescriptorDefinition {
	/// Reference to the root component, inline descriptor takes precedence
	pub fn reference(&self) -> Option<ComponentDescriptorReference> {
		if let Some(inline) = &self.inline {
			return Some(ComponentDescriptorReference {
				repository_context: inline.effective_repository_context().cloned(),
				component_name: inline.name.clone(),
				version: inline.version.clone(),
			});
		}
		self.reference.clone()
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintDefinition {
	#[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
	pub reference: Option<BlueprintReference>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub inline: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintReference {
	pub resource_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportDefinitions {
	#[serde(default)]
	pub data: Vec<DataImport>,
	#[serde(default)]
	pub targets: Vec<TargetImport>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretReference {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMapReference {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}

#[duplicate_item(
	reference_type;
	[SecretReference];
	[ConfigMapReference]
)]
impl reference_type {
	/// Namespace of the referenced object, defaulting to the installation's one
	pub fn namespace_or<'a>(&'a self, default: &'a str) -> &'a str {
		self.namespace
			.as_deref()
			.filter(|ns| !ns.is_empty())
			.unwrap_or(default)
	}

	pub fn key(&self) -> Option<&str> {
		non_empty(&self.key)
	}
}

#[duplicate_item(
	reference_type;
	[SecretReference];
	[ConfigMapReference]
)]
impl Display for reference_type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(namespace) = non_empty(&self.namespace) {
			write!(f, "{}/", namespace)?;
		}
		write!(f, "{}", self.name)?;
		if let Some(key) = self.key() {
			write!(f, "#{}", key)?;
		}
		Ok(())
	}
}

/// Declared data import, as written in the installation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataImport {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data_ref: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret_ref: Option<SecretReference>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub config_map_ref: Option<ConfigMapReference>,
}

/// Validated source of a data import
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataBinding<'a> {
	DataObject(&'a str),
	Secret(&'a SecretReference),
	ConfigMap(&'a ConfigMapReference),
}

fn non_empty(s: &Option<String>) -> Option<&str> {
	s.as_deref().filter(|s| !s.is_empty())
}

impl DataImport {
	pub fn binding(&self) -> Result<DataBinding<'_>> {
		let mut found = Vec::with_capacity(1);
		if let Some(data_ref) = non_empty(&self.data_ref) {
			found.push(DataBinding::DataObject(data_ref));
		}
		if let Some(secret_ref) = &self.secret_ref {
			found.push(DataBinding::Secret(secret_ref));
		}
		if let Some(config_map_ref) = &self.config_map_ref {
			found.push(DataBinding::ConfigMap(config_map_ref));
		}
		match found.as_slice() {
			[binding] => Ok(*binding),
			[] => Err(Error::Configuration(format!(
				"invalid data import '{}': one of dataRef, secretRef or configMapRef must be specified",
				self.name
			))),
			_ => Err(Error::Configuration(format!(
				"invalid data import '{}': only one of dataRef, secretRef or configMapRef may be specified",
				self.name
			))),
		}
	}
}

/// Declared target import, as written in the installation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetImport {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub targets: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_list_ref: Option<String>,
}

/// Validated source of a target import
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetBinding<'a> {
	Single(&'a str),
	// An explicitly empty list is still a list
	List(&'a [String]),
	Selector(&'a str),
}

impl TargetImport {
	pub fn binding(&self) -> Result<TargetBinding<'_>> {
		let mut found = Vec::with_capacity(1);
		if let Some(target) = non_empty(&self.target) {
			found.push(TargetBinding::Single(target));
		}
		if let Some(targets) = &self.targets {
			found.push(TargetBinding::List(targets));
		}
		if let Some(list_ref) = non_empty(&self.target_list_ref) {
			found.push(TargetBinding::Selector(list_ref));
		}
		match found.as_slice() {
			[binding] => Ok(*binding),
			[] => Err(Error::Configuration(format!(
				"invalid target import '{}': one of target, targets, or targetListRef must be specified",
				self.name
			))),
			_ => Err(Error::Configuration(format!(
				"invalid target import '{}': only one of target, targets, or targetListRef may be specified",
				self.name
			))),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportType {
	Data,
	Target,
	TargetList,
}

/// Source generation recorded for a single bound target
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetImportStatus {
	pub target: String,
	#[serde(default)]
	pub source_generation: i64,
}

/// What an import was bound to in a previous pass
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatus {
	pub name: String,
	#[serde(rename = "type")]
	pub import_type: ImportType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data_ref: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret_ref: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub config_map_ref: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub target_list: Vec<TargetImportStatus>,
	#[serde(default)]
	pub source_generation: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationStatus {
	#[serde(default)]
	pub observed_generation: i64,
	#[serde(default)]
	pub imports: Vec<ImportStatus>,
}
