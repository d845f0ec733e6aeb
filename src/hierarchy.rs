//! Parent/child relation between installations.
//!
//! The only parent signal is an owner reference of the installation kind.
//! Everything here is a pure function of the object and its owner list.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

use crate::{
	api::Installation,
	kubemodel::{owner_of_kind, ObjectKind, Scheme},
	Result,
};

pub struct Hierarchy {
	installation_kind: ObjectKind,
}

impl Hierarchy {
	pub fn new(scheme: &Scheme) -> Result<Self> {
		Ok(Self {
			installation_kind: scheme.object_kind::<Installation>()?.clone(),
		})
	}

	fn owners(inst: &Installation) -> &[OwnerReference] {
		inst.metadata.owner_references.as_deref().unwrap_or_default()
	}

	/// Name of the owning installation, empty for root installations
	pub fn parent_name<'a>(&self, inst: &'a Installation) -> &'a str {
		owner_of_kind(Self::owners(inst), &self.installation_kind).unwrap_or_default()
	}

	/// No owner of the installation kind at all
	pub fn is_root(&self, inst: &Installation) -> bool {
		owner_of_kind(Self::owners(inst), &self.installation_kind).is_none()
	}

	pub fn owner_is_installation(&self, owner: Option<&OwnerReference>) -> bool {
		owner.map_or(false, |owner| self.installation_kind.is_owner_of_kind(owner))
	}

	/// Owner is an installation, but not the parent of `inst`
	pub fn has_orphaned_owner(&self, owner: Option<&OwnerReference>, inst: &Installation) -> bool {
		match owner {
			Some(owner) if self.owner_is_installation(Some(owner)) => owner.name != self.parent_name(inst),
			_ => false,
		}
	}

	/// Logical context imports of `inst` are scoped by
	pub fn context_name(&self, inst: &Installation) -> String {
		match self.parent_name(inst) {
			"" => String::new(),
			parent => format!("Inst.{}", parent),
		}
	}
}
