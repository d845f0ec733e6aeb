//! Binding of declared imports to cluster state.
//!
//! Every import is resolved on its own: a failing import never prevents the
//! others of the same installation from being bound.

mod data;
mod status;
mod targets;

pub use targets::target_selector;

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

use crate::{
    api::{BoundDataObject, Installation, TargetExtension},
    store::Store,
    Context, Error, Result,
};

#[derive(Clone, Debug)]
pub struct BinderOptions {
    /// Target list references only see targets labelled as imports
    pub restrict_to_import: bool,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            restrict_to_import: true,
        }
    }
}

/// Resolves imports against a store. Holds no state besides the store handle
pub struct ImportBinder<S> {
    store: S,
    options: BinderOptions,
}

impl<S: Store> ImportBinder<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, BinderOptions::default())
    }

    pub fn with_options(store: S, options: BinderOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Bind every import declared by `installation`, scoped by `context_name`
    pub async fn bind(
        &self,
        ctx: &Context,
        context_name: &str,
        installation: &Installation,
    ) -> Result<ImportBindings> {
        let namespace = installation
            .metadata
            .namespace
            .as_deref()
            .ok_or_else(|| Error::Configuration("installation has no namespace".to_owned()))?;
        let mut out = ImportBindings::default();

        for import in installation.spec.imports.data.iter() {
            let result = self
                .resolve_data_import(ctx, context_name, namespace, import)
                .await
                .map(|(object, owner)| DataImportBinding { object, owner });
            if let Err(e) = &result {
                log::warn!("{}", e);
            }
            out.data.push((import.name.clone(), result));
        }
        for import in installation.spec.imports.targets.iter() {
            let result = self
                .resolve_targets(ctx, context_name, namespace, import)
                .await
                .map(|(targets, references)| TargetImportBinding {
                    targets,
                    references,
                });
            if let Err(e) = &result {
                log::warn!("{}", e);
            }
            out.targets.push((import.name.clone(), result));
        }
        Ok(out)
    }
}

#[derive(Debug)]
pub struct DataImportBinding {
    pub object: BoundDataObject,
    pub owner: Option<OwnerReference>,
}

#[derive(Debug)]
pub struct TargetImportBinding {
    pub targets: Vec<TargetExtension>,
    pub references: Vec<String>,
}

/// Outcome of one pass, one entry per declared import in declaration order
#[derive(Debug, Default)]
pub struct ImportBindings {
    pub data: Vec<(String, Result<DataImportBinding>)>,
    pub targets: Vec<(String, Result<TargetImportBinding>)>,
}

/// Bindings of an installation whose imports all resolved
#[derive(Debug, Default)]
pub struct ResolvedImports {
    pub data: BTreeMap<String, DataImportBinding>,
    pub targets: BTreeMap<String, TargetImportBinding>,
}

impl ImportBindings {
    pub fn errors(&self) -> impl Iterator<Item = (&str, &Error)> {
        let data = self
            .data
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)));
        let targets = self
            .targets
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)));
        data.chain(targets)
    }

    pub fn is_complete(&self) -> bool {
        self.errors().next().is_none()
    }

    /// First failure, in declaration order, fails the whole set
    pub fn into_result(self) -> Result<ResolvedImports> {
        let mut out = ResolvedImports::default();
        for (name, result) in self.data {
            out.data.insert(name, result?);
        }
        for (name, result) in self.targets {
            out.targets.insert(name, result?);
        }
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        api::{DataImport, DataObject, InstallationSpec, TargetImport},
        names::generate_data_object_name,
        store::MemoryStore,
        ErrorKind,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    pub fn binder() -> ImportBinder<MemoryStore> {
        ImportBinder::new(MemoryStore::new())
    }

    pub fn installation(data: Vec<DataImport>, targets: Vec<TargetImport>) -> Installation {
        let mut spec = InstallationSpec::default();
        spec.imports.data = data;
        spec.imports.targets = targets;
        let mut inst = Installation::new("inst", spec);
        inst.metadata.namespace = Some("default".to_owned());
        inst
    }

    pub fn data_object(context: &str, data_ref: &str, generation: i64) -> DataObject {
        DataObject {
            metadata: ObjectMeta {
                name: Some(generate_data_object_name(context, data_ref)),
                namespace: Some("default".to_owned()),
                generation: Some(generation),
                ..Default::default()
            },
            data: serde_json::json!(data_ref),
        }
    }

    pub fn data_ref(name: &str, data_ref: &str) -> DataImport {
        DataImport {
            name: name.to_owned(),
            data_ref: Some(data_ref.to_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn imports_resolve_independently() {
        let binder = binder();
        binder.store().insert(&data_object("", "present", 1)).unwrap();
        let inst = installation(
            vec![data_ref("missing", "absent"), data_ref("ok", "present")],
            vec![TargetImport {
                name: "invalid".to_owned(),
                ..Default::default()
            }],
        );

        let bindings = binder
            .bind(&Context::background(), "", &inst)
            .await
            .unwrap();
        assert!(!bindings.is_complete());
        let errors: Vec<_> = bindings.errors().map(|(n, e)| (n, e.kind())).collect();
        assert_eq!(
            errors,
            vec![
                ("missing", ErrorKind::NotFound),
                ("invalid", ErrorKind::Configuration)
            ]
        );
        assert!(bindings.data[1].1.is_ok());

        let err = bindings.into_result().unwrap_err();
        assert!(err.to_string().starts_with("missing: "));
    }

    #[tokio::test]
    async fn complete_bindings() {
        let binder = binder();
        binder.store().insert(&data_object("Inst.p", "a", 4)).unwrap();
        let inst = installation(vec![data_ref("first", "a")], vec![]);

        let resolved = binder
            .bind(&Context::background(), "Inst.p", &inst)
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(resolved.data["first"].object.generation(), 4);
    }

    #[tokio::test]
    async fn installation_needs_namespace() {
        let binder = binder();
        let mut inst = installation(vec![], vec![]);
        inst.metadata.namespace = None;
        assert!(matches!(
            binder.bind(&Context::background(), "", &inst).await,
            Err(Error::Configuration(_))
        ));
    }
}
