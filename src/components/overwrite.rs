use serde::{Deserialize, Serialize};

use crate::api::{ComponentReference, RepositoryContext};

/// Redirects a component reference before it is fetched.
///
/// Only applied to referenced roots of installations, inline descriptors are
/// never redirected.
pub trait ComponentOverwriter: Send + Sync {
	/// Rewrite `repository_context`/`reference` in place, returns whether
	/// anything was replaced
	fn overwrite(
		&self,
		repository_context: &mut RepositoryContext,
		reference: &mut ComponentReference,
	) -> bool;
}

/// Leaves every reference untouched
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOverwrites;

impl ComponentOverwriter for NoOverwrites {
	fn overwrite(&self, _: &mut RepositoryContext, _: &mut ComponentReference) -> bool {
		false
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverwriteSource {
	pub component_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repository_context: Option<RepositoryContext>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverwriteTarget {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repository_context: Option<RepositoryContext>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub component_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
}

/// Single substitution rule, unset target fields keep the original value
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentOverwrite {
	pub source: OverwriteSource,
	pub target: OverwriteTarget,
}

impl ComponentOverwrite {
	fn matches(&self, repository_context: &RepositoryContext, reference: &ComponentReference) -> bool {
		self.source.component_name == reference.name
			&& self
				.source
				.version
				.as_ref()
				.map_or(true, |v| *v == reference.version)
			&& self
				.source
				.repository_context
				.as_ref()
				.map_or(true, |c| c == repository_context)
	}
}

/// Ordered rule list, first matching rule wins
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overwrites(pub Vec<ComponentOverwrite>);

impl ComponentOverwriter for Overwrites {
	fn overwrite(
		&self,
		repository_context: &mut RepositoryContext,
		reference: &mut ComponentReference,
	) -> bool {
		let rule = match self.0.iter().find(|r| r.matches(repository_context, reference)) {
			Some(rule) => rule,
			None => return false,
		};
		log::debug!("Overwriting component {} from {}", reference, repository_context);
		if let Some(context) = &rule.target.repository_context {
			*repository_context = context.clone();
		}
		if let Some(name) = &rule.target.component_name {
			reference.name = name.clone();
		}
		if let Some(version) = &rule.target.version {
			reference.version = version.clone();
		}
		true
	}
}
