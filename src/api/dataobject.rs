use std::borrow::Cow;

use k8s_openapi::{apimachinery::pkg::apis::meta::v1::ObjectMeta, NamespaceResourceScope};
use kube::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DataImport, LANDSCAPER_GROUP, LANDSCAPER_VERSION};

/// Opaque payload stored in the cluster.
///
/// Carries its data at top level instead of a `spec`, so `Resource` is
/// implemented by hand instead of derived.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataObject {
	pub metadata: ObjectMeta,
	#[serde(default)]
	pub data: Value,
}

impl Resource for DataObject {
	type DynamicType = ();
	type Scope = NamespaceResourceScope;

	fn kind(_: &()) -> Cow<'_, str> {
		"DataObject".into()
	}
	fn group(_: &()) -> Cow<'_, str> {
		LANDSCAPER_GROUP.into()
	}
	fn version(_: &()) -> Cow<'_, str> {
		LANDSCAPER_VERSION.into()
	}
	fn plural(_: &()) -> Cow<'_, str> {
		"dataobjects".into()
	}
	fn meta(&self) -> &ObjectMeta {
		&self.metadata
	}
	fn meta_mut(&mut self) -> &mut ObjectMeta {
		&mut self.metadata
	}
}

impl DataObject {
	/// In-memory object standing in for a secret or config map, never persisted
	pub fn synthesized(data: Value, generation: i64) -> Self {
		Self {
			metadata: ObjectMeta {
				generation: Some(generation),
				..Default::default()
			},
			data,
		}
	}

	pub fn generation(&self) -> i64 {
		self.metadata.generation.unwrap_or_default()
	}
}

/// Data object bound to the import that requested it
#[derive(Clone, Debug, PartialEq)]
pub struct BoundDataObject {
	pub raw: DataObject,
	pub import: DataImport,
}

impl BoundDataObject {
	pub fn data(&self) -> &Value {
		&self.raw.data
	}

	/// Generation of whatever was actually read, object or secret/config map
	pub fn generation(&self) -> i64 {
		self.raw.generation()
	}
}
