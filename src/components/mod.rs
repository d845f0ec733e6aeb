//! Transitive component descriptor resolution.

mod local;
mod overwrite;

pub use local::LocalRegistry;
pub use overwrite::{
    ComponentOverwrite, ComponentOverwriter, NoOverwrites, OverwriteSource, OverwriteTarget,
    Overwrites,
};

use std::{future::Future, pin::Pin};

use async_trait::async_trait;

use crate::{
    api::{ComponentDescriptor, ComponentReference, EffectiveComponentDescriptorList, RepositoryContext},
    Context, Error, Result,
};

/// Fetches single component descriptors from a repository
#[async_trait]
pub trait ComponentResolver: Send + Sync {
    async fn resolve(
        &self,
        repository_context: &RepositoryContext,
        reference: &ComponentReference,
    ) -> Result<ComponentDescriptor>;
}

#[async_trait]
impl<R: ComponentResolver + ?Sized> ComponentResolver for &R {
    async fn resolve(
        &self,
        repository_context: &RepositoryContext,
        reference: &ComponentReference,
    ) -> Result<ComponentDescriptor> {
        (**self).resolve(repository_context, reference).await
    }
}

fn check_cycle(reference: &ComponentReference, stack: &[ComponentReference]) -> Result<()> {
    if stack.contains(reference) {
        let chain = stack
            .iter()
            .chain(std::iter::once(reference))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        return Err(Error::CycleDetected(chain.join(" -> ")));
    }
    Ok(())
}

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Pre-order depth-first expansion of `descriptor` references into `out`
fn resolve_references<'a, R: ComponentResolver + ?Sized>(
    ctx: &'a Context,
    resolver: &'a R,
    descriptor: &'a ComponentDescriptor,
    stack: &'a mut Vec<ComponentReference>,
    out: &'a mut Vec<ComponentDescriptor>,
) -> ResolveFuture<'a> {
    Box::pin(async move {
        if descriptor.component_references.is_empty() {
            return Ok(());
        }
        // Every component resolves its own dependencies from its own context
        let repository_context = descriptor.effective_repository_context().ok_or_else(|| {
            Error::Configuration(format!(
                "component {} has references but no repository context",
                descriptor.reference()
            ))
        })?;
        for reference in descriptor.component_references.iter() {
            check_cycle(reference, stack)?;
            log::debug!(
                "Resolving {} (required by {}) from {}",
                reference,
                descriptor.reference(),
                repository_context
            );
            let resolved = ctx
                .run(resolver.resolve(repository_context, reference))
                .await?;

            stack.push(reference.clone());
            out.push(resolved.clone());
            resolve_references(ctx, resolver, &resolved, stack, out).await?;
            stack.pop();
        }
        Ok(())
    })
}

/// Resolve `root` and every descriptor transitively referenced by it.
///
/// The first resolver failure aborts traversal and is returned as is, a
/// partial list is never produced. Components reachable over several paths are
/// listed once per path.
pub async fn resolve_effective_list<R: ComponentResolver + ?Sized>(
    ctx: &Context,
    resolver: &R,
    root: ComponentDescriptor,
) -> Result<EffectiveComponentDescriptorList> {
    let mut stack = vec![root.reference()];
    let mut out = Vec::new();
    resolve_references(ctx, resolver, &root, &mut stack, &mut out).await?;
    out.insert(0, root);
    log::debug!("Resolved {} component descriptors", out.len());
    Ok(EffectiveComponentDescriptorList { components: out })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{collections::HashMap, sync::Mutex};

    /// Map-backed resolver which records every call
    #[derive(Default)]
    pub struct FakeResolver {
        descriptors: HashMap<(RepositoryContext, ComponentReference), ComponentDescriptor>,
        pub calls: Mutex<Vec<(RepositoryContext, ComponentReference)>>,
    }

    impl FakeResolver {
        pub fn add(&mut self, repository_context: &RepositoryContext, cd: ComponentDescriptor) {
            self.descriptors
                .insert((repository_context.clone(), cd.reference()), cd);
        }
    }

    #[async_trait]
    impl ComponentResolver for FakeResolver {
        async fn resolve(
            &self,
            repository_context: &RepositoryContext,
            reference: &ComponentReference,
        ) -> Result<ComponentDescriptor> {
            self.calls
                .lock()
                .unwrap()
                .push((repository_context.clone(), reference.clone()));
            self.descriptors
                .get(&(repository_context.clone(), reference.clone()))
                .cloned()
                .ok_or_else(|| Error::not_found("ComponentDescriptor", reference.to_string()))
        }
    }

    pub fn cd(name: &str, repo: &RepositoryContext, refs: &[&str]) -> ComponentDescriptor {
        ComponentDescriptor {
            name: name.to_owned(),
            version: "0.0.1".to_owned(),
            repository_contexts: vec![repo.clone()],
            component_references: refs
                .iter()
                .map(|name| ComponentReference::new(*name, "0.0.1"))
                .collect(),
        }
    }

    fn names(list: &EffectiveComponentDescriptorList) -> Vec<&str> {
        list.iter().map(|cd| cd.name.as_str()).collect()
    }

    #[tokio::test]
    async fn component_itself() {
        let repo = RepositoryContext::oci("example.com");
        let resolver = FakeResolver::default();
        let root = cd("cd", &repo, &[]);

        let list = resolve_effective_list(&Context::background(), &resolver, root.clone())
            .await
            .unwrap();
        assert_eq!(list.components, vec![root]);
        assert!(resolver.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn direct_references() {
        let repo = RepositoryContext::oci("example.com");
        let mut resolver = FakeResolver::default();
        resolver.add(&repo, cd("l11", &repo, &[]));
        resolver.add(&repo, cd("l12", &repo, &[]));

        let list = resolve_effective_list(
            &Context::background(),
            &resolver,
            cd("cd", &repo, &["l11", "l12"]),
        )
        .await
        .unwrap();
        assert_eq!(names(&list), vec!["cd", "l11", "l12"]);
    }

    #[tokio::test]
    async fn recursive_references() {
        let repo = RepositoryContext::oci("example.com");
        let mut resolver = FakeResolver::default();
        resolver.add(&repo, cd("l11", &repo, &["l111"]));
        resolver.add(&repo, cd("l111", &repo, &[]));

        let list = resolve_effective_list(&Context::background(), &resolver, cd("cd", &repo, &["l11"]))
            .await
            .unwrap();
        assert_eq!(names(&list), vec!["cd", "l11", "l111"]);
    }

    #[tokio::test]
    async fn pre_order() {
        let repo = RepositoryContext::oci("example.com");
        let mut resolver = FakeResolver::default();
        resolver.add(&repo, cd("a", &repo, &["a1"]));
        resolver.add(&repo, cd("a1", &repo, &[]));
        resolver.add(&repo, cd("b", &repo, &[]));

        let list = resolve_effective_list(&Context::background(), &resolver, cd("cd", &repo, &["a", "b"]))
            .await
            .unwrap();
        assert_eq!(names(&list), vec!["cd", "a", "a1", "b"]);
    }

    #[tokio::test]
    async fn context_is_carried_per_component() {
        let root_repo = RepositoryContext::oci("root.example.com");
        let other_repo = RepositoryContext::oci("other.example.com");
        let mut resolver = FakeResolver::default();
        // l11 declares its own context, its dependency must be fetched from there
        resolver.add(&root_repo, cd("l11", &other_repo, &["l111"]));
        resolver.add(&other_repo, cd("l111", &other_repo, &[]));

        let list = resolve_effective_list(
            &Context::background(),
            &resolver,
            cd("cd", &root_repo, &["l11"]),
        )
        .await
        .unwrap();
        assert_eq!(names(&list), vec!["cd", "l11", "l111"]);

        let calls = resolver.calls.lock().unwrap();
        assert_eq!(calls[0].0, root_repo);
        assert_eq!(calls[1].0, other_repo);
    }

    #[tokio::test]
    async fn fails_without_partial_result() {
        let repo = RepositoryContext::oci("example.com");
        let mut resolver = FakeResolver::default();
        resolver.add(&repo, cd("l11", &repo, &[]));

        let err = resolve_effective_list(
            &Context::background(),
            &resolver,
            cd("cd", &repo, &["l11", "missing", "never"]),
        )
        .await
        .unwrap_err();
        assert!(matches!(&err, Error::NotFound { name, .. } if name == "missing:0.0.1"));
        // traversal stopped at the first failure
        assert_eq!(resolver.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn diamonds_are_kept() {
        let repo = RepositoryContext::oci("example.com");
        let mut resolver = FakeResolver::default();
        resolver.add(&repo, cd("a", &repo, &["shared"]));
        resolver.add(&repo, cd("b", &repo, &["shared"]));
        resolver.add(&repo, cd("shared", &repo, &[]));

        let list = resolve_effective_list(&Context::background(), &resolver, cd("cd", &repo, &["a", "b"]))
            .await
            .unwrap();
        assert_eq!(names(&list), vec!["cd", "a", "shared", "b", "shared"]);
    }

    #[tokio::test]
    async fn cycles_are_detected() {
        let repo = RepositoryContext::oci("example.com");
        let mut resolver = FakeResolver::default();
        resolver.add(&repo, cd("a", &repo, &["b"]));
        resolver.add(&repo, cd("b", &repo, &["a"]));

        let err = resolve_effective_list(&Context::background(), &resolver, cd("cd", &repo, &["a"]))
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            Error::CycleDetected(chain) if chain == "cd:0.0.1 -> a:0.0.1 -> b:0.0.1 -> a:0.0.1"
        ));
    }

    #[tokio::test]
    async fn missing_repository_context() {
        let resolver = FakeResolver::default();
        let mut root = cd("cd", &RepositoryContext::oci("example.com"), &["a"]);
        root.repository_contexts.clear();

        let err = resolve_effective_list(&Context::background(), &resolver, root)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn cancelled() {
        let repo = RepositoryContext::oci("example.com");
        let mut resolver = FakeResolver::default();
        resolver.add(&repo, cd("a", &repo, &[]));
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let err = resolve_effective_list(&ctx, &resolver, cd("cd", &repo, &["a"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(resolver.calls.lock().unwrap().is_empty());
    }
}
