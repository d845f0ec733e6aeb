use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::ComponentResolver;
use crate::{
    api::{ComponentDescriptor, ComponentReference, RepositoryContext},
    util::from_yaml,
    Error, Result,
};

/// Descriptors stored on disk as `<root>/<component name>/<version>.yaml`.
///
/// Serves every repository context, which makes it useful for offline
/// inspection of installations.
#[derive(Clone, Debug)]
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn descriptor_path(&self, reference: &ComponentReference) -> Result<PathBuf> {
        let components = Path::new(&reference.name).components();
        if reference.version.contains('/')
            || components
                .clone()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(Error::Configuration(format!(
                "component reference {} can't be mapped to a registry path",
                reference
            )));
        }
        let mut path = self.root.clone();
        path.extend(components);
        path.push(format!("{}.yaml", reference.version));
        Ok(path)
    }
}

#[async_trait]
impl ComponentResolver for LocalRegistry {
    async fn resolve(
        &self,
        repository_context: &RepositoryContext,
        reference: &ComponentReference,
    ) -> Result<ComponentDescriptor> {
        let path = self.descriptor_path(reference)?;
        log::trace!(
            "Reading {} for {} ({})",
            path.display(),
            reference,
            repository_context
        );
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found("ComponentDescriptor", reference.to_string()))
            }
            Err(e) => {
                return Err(Error::Read {
                    origin: format!("{} ({})", path.display(), reference),
                    source: e,
                })
            }
        };
        let descriptor: ComponentDescriptor = from_yaml(&contents, &path.display().to_string())?;
        if descriptor.reference() != *reference {
            return Err(Error::InvalidData {
                origin: path.display().to_string(),
                message: format!(
                    "expected descriptor of {}, found {}",
                    reference,
                    descriptor.reference()
                ),
            });
        }
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{components::resolve_effective_list, Context};
    use std::fs;

    fn write(root: &Path, name: &str, version: &str, contents: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.yaml", version)), contents).unwrap();
    }

    #[tokio::test]
    async fn resolves_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "example.com/dep",
            "v1.0.0",
            "name: example.com/dep\nversion: v1.0.0\nrepositoryContexts:\n- type: local\n  baseUrl: ./\n",
        );
        let registry = LocalRegistry::new(dir.path());
        let repo = RepositoryContext {
            type_: "local".to_owned(),
            base_url: "./".to_owned(),
        };

        let root = ComponentDescriptor {
            name: "example.com/root".to_owned(),
            version: "v1.0.0".to_owned(),
            repository_contexts: vec![repo],
            component_references: vec![ComponentReference::new("example.com/dep", "v1.0.0")],
        };
        let list = resolve_effective_list(&Context::background(), &registry, root)
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.get("example.com/dep", "v1.0.0").is_some());
    }

    #[tokio::test]
    async fn missing_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path());
        let err = registry
            .resolve(
                &RepositoryContext::oci("example.com"),
                &ComponentReference::new("example.com/none", "v1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn mismatching_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a", "v1", "name: b\nversion: v1\n");
        let registry = LocalRegistry::new(dir.path());
        let err = registry
            .resolve(
                &RepositoryContext::oci("example.com"),
                &ComponentReference::new("a", "v1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
    }

    #[tokio::test]
    async fn read_failure_names_file_and_component() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("v1.yaml")).unwrap();
        let registry = LocalRegistry::new(dir.path());
        let err = registry
            .resolve(
                &RepositoryContext::oci("example.com"),
                &ComponentReference::new("a", "v1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        let message = err.to_string();
        assert!(message.contains("v1.yaml"), "{}", message);
        assert!(message.contains("a:v1"), "{}", message);
    }

    #[tokio::test]
    async fn rejects_escaping_names() {
        let registry = LocalRegistry::new("/nonexistent");
        let err = registry
            .resolve(
                &RepositoryContext::oci("example.com"),
                &ComponentReference::new("../etc", "v1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
