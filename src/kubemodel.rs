use std::{
	any::TypeId,
	collections::HashMap,
	fmt::{self, Display},
};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::Resource;

use crate::{Error, Result};

/// Identifies object type in cluster
#[derive(Clone, Debug, Eq)]
pub struct ObjectKind {
	// landscaper.gardener.cloud/v1alpha1
	pub api_version: String,
	// Installation
	pub kind: String,
}

impl ObjectKind {
	pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
		Self {
			api_version: api_version.into(),
			kind: kind.into(),
		}
	}

	pub fn of<K: Resource<DynamicType = ()>>() -> Self {
		Self::new(K::api_version(&()), K::kind(&()))
	}

	/// Group part of api version, empty for core group
	pub fn group(&self) -> &str {
		match self.api_version.split_once('/') {
			Some((group, _version)) => group,
			None => "",
		}
	}

	pub fn is_owner_of_kind(&self, owner: &OwnerReference) -> bool {
		*self == Self::new(owner.api_version.as_str(), owner.kind.as_str())
	}
}

// Version is ignored, owners written by older api versions still match
impl PartialEq for ObjectKind {
	fn eq(&self, other: &Self) -> bool {
		self.group() == other.group() && self.kind == other.kind
	}
}

impl Display for ObjectKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.api_version, self.kind)
	}
}

/// Identifies object in cluster
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectLocation {
	pub name: String,
	pub namespace: String,
}

impl ObjectLocation {
	pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			namespace: namespace.into(),
		}
	}
}

impl Display for ObjectLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} in {}", self.name, self.namespace)
	}
}

/// Type registry, constructed once and handed to whoever needs type lookups
#[derive(Clone, Debug, Default)]
pub struct Scheme {
	kinds: HashMap<TypeId, ObjectKind>,
}

impl Scheme {
	pub fn new() -> Self {
		Self::default()
	}

	/// Scheme with every type the resolution core reads
	pub fn landscaper() -> Self {
		let mut scheme = Self::new();
		scheme.register::<crate::api::Installation>();
		scheme.register::<crate::api::DataObject>();
		scheme.register::<crate::api::Target>();
		scheme.register::<k8s_openapi::api::core::v1::Secret>();
		scheme.register::<k8s_openapi::api::core::v1::ConfigMap>();
		scheme
	}

	pub fn register<K: Resource<DynamicType = ()> + 'static>(&mut self) -> &mut Self {
		self.kinds.insert(TypeId::of::<K>(), ObjectKind::of::<K>());
		self
	}

	pub fn object_kind<K: 'static>(&self) -> Result<&ObjectKind> {
		self.kinds.get(&TypeId::of::<K>()).ok_or_else(|| {
			Error::Configuration(format!(
				"type {} is not registered in scheme",
				std::any::type_name::<K>()
			))
		})
	}
}

/// Name of the first owner of given kind
pub fn owner_of_kind<'a>(owners: &'a [OwnerReference], kind: &ObjectKind) -> Option<&'a str> {
	owners
		.iter()
		.find(|owner| kind.is_owner_of_kind(owner))
		.map(|owner| owner.name.as_str())
}

/// Controlling owner reference, if the object has one
pub fn controller_owner(meta: &ObjectMeta) -> Option<&OwnerReference> {
	meta.owner_references
		.as_deref()
		.unwrap_or_default()
		.iter()
		.find(|owner| owner.controller == Some(true))
}
