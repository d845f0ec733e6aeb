//! Assembly of the internal installation representation.

use crate::{
    api::{BlueprintDefinition, ComponentDescriptor, EffectiveComponentDescriptorList, Installation},
    components::{resolve_effective_list, ComponentOverwriter, ComponentResolver},
    hierarchy::Hierarchy,
    imports::{ImportBinder, ImportBindings},
    store::Store,
    Context, Error, Result,
};

/// Root component descriptor of `inst`, `None` if it declares none.
///
/// Inline descriptors take precedence and are used as is, without a lookup
/// and without overwrites. References are passed through `overwriter`, then
/// fetched from the resulting repository context.
pub async fn resolve_component_descriptor<R, O>(
    ctx: &Context,
    resolver: &R,
    overwriter: &O,
    inst: &Installation,
) -> Result<Option<ComponentDescriptor>>
where
    R: ComponentResolver + ?Sized,
    O: ComponentOverwriter + ?Sized,
{
    let definition = match &inst.spec.component_descriptor {
        Some(definition) => definition,
        None => return Ok(None),
    };
    if let Some(inline) = &definition.inline {
        return Ok(Some(inline.clone()));
    }
    let reference = match &definition.reference {
        Some(reference) => reference,
        None => return Ok(None),
    };
    let mut repository_context = reference.repository_context.clone().ok_or_else(|| {
        Error::Configuration(format!(
            "component descriptor reference {} has no repository context",
            reference.component()
        ))
    })?;
    let mut component = reference.component();
    overwriter.overwrite(&mut repository_context, &mut component);
    let descriptor = ctx
        .run(resolver.resolve(&repository_context, &component))
        .await?;
    Ok(Some(descriptor))
}

/// Installation with everything the execution pipeline needs resolved
#[derive(Debug)]
pub struct InternalInstallation {
    pub installation: Installation,
    /// Context the imports were resolved in
    pub context_name: String,
    pub blueprint: BlueprintDefinition,
    pub components: Option<EffectiveComponentDescriptorList>,
    pub imports: ImportBindings,
}

impl InternalInstallation {
    /// Resolve the component graph, then bind imports.
    ///
    /// Graph failures abort, import failures are kept per import in
    /// [`InternalInstallation::imports`].
    pub async fn resolve<R, O, S>(
        ctx: &Context,
        resolver: &R,
        overwriter: &O,
        binder: &ImportBinder<S>,
        hierarchy: &Hierarchy,
        installation: Installation,
    ) -> Result<Self>
    where
        R: ComponentResolver + ?Sized,
        O: ComponentOverwriter + ?Sized,
        S: Store,
    {
        let components = match resolve_component_descriptor(ctx, resolver, overwriter, &installation).await? {
            Some(root) => Some(resolve_effective_list(ctx, resolver, root).await?),
            None => None,
        };
        let context_name = hierarchy.context_name(&installation);
        log::debug!(
            "Binding imports of {} in context {:?}",
            installation.metadata.name.as_deref().unwrap_or_default(),
            context_name
        );
        let imports = binder.bind(ctx, &context_name, &installation).await?;
        Ok(Self {
            blueprint: installation.spec.blueprint.clone(),
            installation,
            context_name,
            components,
            imports,
        })
    }

    pub fn name(&self) -> &str {
        self.installation.metadata.name.as_deref().unwrap_or_default()
    }
}
