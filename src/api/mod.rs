//! Resource types read by the resolution core.
//!
//! Label keys below are part of the contract with whatever writes data objects
//! and targets into the cluster, they must not change.

mod component;
mod dataobject;
mod installation;
mod target;

pub use component::{
	ComponentDescriptor, ComponentReference, EffectiveComponentDescriptorList, RepositoryContext,
};
pub use dataobject::{BoundDataObject, DataObject};
pub use installation::{
	BlueprintDefinition, BlueprintReference, ComponentDescriptorDefinition,
	ComponentDescriptorReference, ConfigMapReference, DataBinding, DataImport, ImportDefinitions,
	ImportStatus, ImportType, Installation, InstallationSpec, InstallationStatus, SecretReference,
	TargetBinding, TargetImport, TargetImportStatus,
};
pub use target::{LocalSecretReference, Target, TargetExtension, TargetExtensionList, TargetSpec};

pub const LANDSCAPER_GROUP: &str = "landscaper.gardener.cloud";
pub const LANDSCAPER_VERSION: &str = "v1alpha1";

/// Logical context a data object or target belongs to, absent for root scope
pub const DATA_OBJECT_CONTEXT_LABEL: &str = "data.landscaper.gardener.cloud/context";
/// Whether object was created for an import or an export
pub const DATA_OBJECT_SOURCE_TYPE_LABEL: &str = "data.landscaper.gardener.cloud/sourceType";
/// Logical key, used by target list references
pub const DATA_OBJECT_KEY_LABEL: &str = "data.landscaper.gardener.cloud/key";

pub const IMPORT_SOURCE_TYPE: &str = "import";
pub const EXPORT_SOURCE_TYPE: &str = "export";
