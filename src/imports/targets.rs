use labelselector::{Requirement, Selector};

use super::ImportBinder;
use crate::{
    api::{
        Target, TargetBinding, TargetExtension, TargetExtensionList, TargetImport,
        DATA_OBJECT_CONTEXT_LABEL, DATA_OBJECT_KEY_LABEL, DATA_OBJECT_SOURCE_TYPE_LABEL,
        IMPORT_SOURCE_TYPE,
    },
    names::generate_data_object_name,
    store::Store,
    Context, Error, Result,
};

/// Selector for targets of one logical context.
///
/// Root scope (empty context) selects targets without a context label at all,
/// so root and nested imports never see each other's targets.
pub fn target_selector(
    context_name: &str,
    labels: &[(&str, &str)],
    restrict_to_import: bool,
) -> Result<Selector> {
    let mut selector = Selector::new();
    if context_name.is_empty() {
        selector.push(Requirement::does_not_exist(DATA_OBJECT_CONTEXT_LABEL)?);
    } else {
        selector.push(Requirement::equals(DATA_OBJECT_CONTEXT_LABEL, context_name)?);
    }
    for (key, value) in labels {
        selector.push(Requirement::equals(*key, *value)?);
    }
    if restrict_to_import {
        selector.push(Requirement::equals(
            DATA_OBJECT_SOURCE_TYPE_LABEL,
            IMPORT_SOURCE_TYPE,
        )?);
    }
    Ok(selector)
}

impl<S: Store> ImportBinder<S> {
    /// Targets bound by a target import, and the names the import referenced
    pub async fn resolve_targets(
        &self,
        ctx: &Context,
        context_name: &str,
        namespace: &str,
        import: &TargetImport,
    ) -> Result<(Vec<TargetExtension>, Vec<String>)> {
        self.fetch_targets(ctx, context_name, namespace, import)
            .await
            .map_err(|e| e.for_import(&import.name))
    }

    async fn fetch_targets(
        &self,
        ctx: &Context,
        context_name: &str,
        namespace: &str,
        import: &TargetImport,
    ) -> Result<(Vec<TargetExtension>, Vec<String>)> {
        match import.binding()? {
            TargetBinding::Single(name) => {
                let target = self.get_target(ctx, context_name, namespace, name).await?;
                Ok((
                    vec![TargetExtension::new(target, import)],
                    vec![name.to_owned()],
                ))
            }
            TargetBinding::List(names) => {
                let list = self
                    .get_targets_by_names(ctx, context_name, namespace, names, import)
                    .await?;
                Ok((list.into_inner(), names.to_vec()))
            }
            TargetBinding::Selector(list_ref) => {
                let list = self
                    .get_targets_by_selector(
                        ctx,
                        context_name,
                        namespace,
                        &[(DATA_OBJECT_KEY_LABEL, list_ref)],
                        import,
                    )
                    .await?;
                Ok((list.into_inner(), vec![list_ref.to_owned()]))
            }
        }
    }

    async fn get_target(
        &self,
        ctx: &Context,
        context_name: &str,
        namespace: &str,
        name: &str,
    ) -> Result<Target> {
        let object_name = generate_data_object_name(context_name, name);
        match ctx.run(self.store.get::<Target>(namespace, &object_name)).await {
            Err(Error::NotFound { kind, .. }) => Err(Error::not_found(
                kind,
                format!("{} ({}/{}) in {}", object_name, context_name, name, namespace),
            )),
            other => other,
        }
    }

    /// Every name is fetched separately, all of them must exist
    pub async fn get_targets_by_names(
        &self,
        ctx: &Context,
        context_name: &str,
        namespace: &str,
        names: &[String],
        import: &TargetImport,
    ) -> Result<TargetExtensionList> {
        let mut targets = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.get_target(ctx, context_name, namespace, name).await {
                Ok(target) => targets.push(target),
                Err(Error::NotFound { .. }) => {
                    log::debug!("Target {} of import {} not found", name, import.name);
                    missing.push(name.clone());
                }
                Err(e) => return Err(e),
            }
        }
        if targets.len() != names.len() {
            return Err(Error::CountMismatch {
                expected: names.len(),
                actual: targets.len(),
                missing,
            });
        }
        Ok(TargetExtensionList::new(targets, import))
    }

    /// Targets of the current context matching extra `labels`
    pub async fn get_targets_by_selector(
        &self,
        ctx: &Context,
        context_name: &str,
        namespace: &str,
        labels: &[(&str, &str)],
        import: &TargetImport,
    ) -> Result<TargetExtensionList> {
        let selector = target_selector(context_name, labels, self.options.restrict_to_import)?;
        log::debug!(
            "Listing targets of import {} with selector {}",
            import.name,
            selector
        );
        let targets = ctx.run(self.store.list::<Target>(namespace, &selector)).await?;
        let list = TargetExtensionList::new(targets, import);
        if list.is_empty() {
            log::debug!("No targets match {}", selector);
        } else {
            log::trace!("{} targets match {}", list.len(), selector);
        }
        Ok(list)
    }
}
