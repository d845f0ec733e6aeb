use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{ConfigMap, Secret},
    apimachinery::pkg::apis::meta::v1::OwnerReference,
    ByteString,
};
use serde_json::Value;

use super::ImportBinder;
use crate::{
    api::{BoundDataObject, ConfigMapReference, DataBinding, DataImport, DataObject, SecretReference},
    kubemodel::controller_owner,
    names::generate_data_object_name,
    store::Store,
    util::json_payload,
    Context, Error, Result,
};

/// Payload of a secret or config map entry set.
///
/// With a key, the entry must exist and hold json. Without one, every entry
/// becomes a string field of a json object.
fn entries_payload<'a>(
    mut entries: impl Iterator<Item = (&'a String, &'a [u8])>,
    key: Option<&str>,
    kind: &str,
    reference: &dyn std::fmt::Display,
) -> Result<Value> {
    let origin = format!("{} {}", kind, reference);
    match key {
        Some(key) => {
            let (_, bytes) = entries
                .find(|(k, _)| k.as_str() == key)
                .ok_or_else(|| {
                    Error::not_found(format!("{} key", kind), format!("{} in {}", key, reference))
                })?;
            json_payload(bytes, &origin)
        }
        None => {
            let mut out = serde_json::Map::new();
            for (k, bytes) in entries {
                let value = String::from_utf8(bytes.to_vec()).map_err(|e| Error::InvalidData {
                    origin: origin.clone(),
                    message: format!("entry {}: {}", k, e),
                })?;
                out.insert(k.clone(), Value::String(value));
            }
            Ok(Value::Object(out))
        }
    }
}

fn secret_bytes(data: &Option<BTreeMap<String, ByteString>>) -> impl Iterator<Item = (&String, &[u8])> {
    data.iter()
        .flatten()
        .map(|(k, v)| (k, v.0.as_slice()))
}

impl<S: Store> ImportBinder<S> {
    /// Resolve single data import in the installation namespace.
    ///
    /// Secret and config map imports are returned as synthesized data objects
    /// carrying the generation of the object that was read. The owner
    /// reference is the controller of the fetched data object, if it has one.
    pub async fn resolve_data_import(
        &self,
        ctx: &Context,
        context_name: &str,
        namespace: &str,
        import: &DataImport,
    ) -> Result<(BoundDataObject, Option<OwnerReference>)> {
        let raw = self
            .fetch_data(ctx, context_name, namespace, import)
            .await
            .map_err(|e| e.for_import(&import.name))?;
        let owner = controller_owner(&raw.metadata).cloned();
        log::debug!(
            "Import {} bound at generation {}",
            import.name,
            raw.generation()
        );
        Ok((
            BoundDataObject {
                raw,
                import: import.clone(),
            },
            owner,
        ))
    }

    async fn fetch_data(
        &self,
        ctx: &Context,
        context_name: &str,
        namespace: &str,
        import: &DataImport,
    ) -> Result<DataObject> {
        match import.binding()? {
            DataBinding::DataObject(data_ref) => {
                let name = generate_data_object_name(context_name, data_ref);
                match ctx.run(self.store.get::<DataObject>(namespace, &name)).await {
                    Err(Error::NotFound { kind, .. }) => Err(Error::not_found(
                        kind,
                        format!("{} ({}/{}) in {}", name, context_name, data_ref, namespace),
                    )),
                    other => other,
                }
            }
            DataBinding::Secret(reference) => self.fetch_secret(ctx, namespace, reference).await,
            DataBinding::ConfigMap(reference) => {
                self.fetch_config_map(ctx, namespace, reference).await
            }
        }
    }

    async fn fetch_secret(
        &self,
        ctx: &Context,
        namespace: &str,
        reference: &SecretReference,
    ) -> Result<DataObject> {
        let secret: Secret = ctx
            .run(self.store.get(reference.namespace_or(namespace), &reference.name))
            .await?;
        let data = entries_payload(
            secret_bytes(&secret.data),
            reference.key(),
            "Secret",
            reference,
        )?;
        Ok(DataObject::synthesized(
            data,
            secret.metadata.generation.unwrap_or_default(),
        ))
    }

    async fn fetch_config_map(
        &self,
        ctx: &Context,
        namespace: &str,
        reference: &ConfigMapReference,
    ) -> Result<DataObject> {
        let config_map: ConfigMap = ctx
            .run(self.store.get(reference.namespace_or(namespace), &reference.name))
            .await?;
        let text = config_map
            .data
            .iter()
            .flatten()
            .map(|(k, v)| (k, v.as_bytes()));
        let entries = text.chain(secret_bytes(&config_map.binary_data));
        let data = entries_payload(entries, reference.key(), "ConfigMap", reference)?;
        Ok(DataObject::synthesized(
            data,
            config_map.metadata.generation.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{imports::tests::binder, ErrorKind};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use serde_json::json;

    fn secret(name: &str, generation: i64, entries: &[(&str, &str)]) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                namespace: Some("default".to_owned()),
                generation: Some(generation),
                ..Default::default()
            },
            data: Some(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn secret_import(key: Option<&str>) -> DataImport {
        DataImport {
            name: "creds".to_owned(),
            secret_ref: Some(SecretReference {
                name: "my-secret".to_owned(),
                namespace: None,
                key: key.map(str::to_owned),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn data_object_by_derived_name() {
        let binder = binder();
        let mut owner = OwnerReference {
            api_version: "landscaper.gardener.cloud/v1alpha1".to_owned(),
            kind: "Installation".to_owned(),
            name: "exporter".to_owned(),
            controller: Some(true),
            ..Default::default()
        };
        owner.uid = "1234".to_owned();
        binder
            .store()
            .insert(&DataObject {
                metadata: ObjectMeta {
                    name: Some(generate_data_object_name("Inst.root", "my-data")),
                    namespace: Some("default".to_owned()),
                    generation: Some(3),
                    owner_references: Some(vec![owner.clone()]),
                    ..Default::default()
                },
                data: json!({ "replicas": 3 }),
            })
            .unwrap();
        let import = DataImport {
            name: "config".to_owned(),
            data_ref: Some("my-data".to_owned()),
            ..Default::default()
        };

        let (bound, found_owner) = binder
            .resolve_data_import(&Context::background(), "Inst.root", "default", &import)
            .await
            .unwrap();
        assert_eq!(bound.data(), &json!({ "replicas": 3 }));
        assert_eq!(bound.generation(), 3);
        assert_eq!(bound.import, import);
        assert_eq!(found_owner, Some(owner));

        // same logical ref in a sibling context is a different object
        let err = binder
            .resolve_data_import(&Context::background(), "Inst.other", "default", &import)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().starts_with("config: "));
        assert!(err.to_string().contains("Inst.other/my-data"));
    }

    #[tokio::test]
    async fn secret_generation_is_tracked() {
        let binder = binder();
        binder
            .store()
            .insert(&secret("my-secret", 1, &[("config", r#"{"a":1}"#)]))
            .unwrap();
        let import = secret_import(Some("config"));

        let (bound, owner) = binder
            .resolve_data_import(&Context::background(), "", "default", &import)
            .await
            .unwrap();
        assert_eq!(bound.data(), &json!({ "a": 1 }));
        assert_eq!(bound.generation(), 1);
        assert_eq!(owner, None);

        binder
            .store()
            .insert(&secret("my-secret", 2, &[("config", r#"{"a":2}"#)]))
            .unwrap();
        let (bound, _) = binder
            .resolve_data_import(&Context::background(), "", "default", &import)
            .await
            .unwrap();
        assert_eq!(bound.data(), &json!({ "a": 2 }));
        assert_eq!(bound.generation(), 2);
    }

    #[tokio::test]
    async fn secret_without_key() {
        let binder = binder();
        binder
            .store()
            .insert(&secret("my-secret", 1, &[("user", "admin"), ("password", "hunter2")]))
            .unwrap();

        let (bound, _) = binder
            .resolve_data_import(&Context::background(), "", "default", &secret_import(None))
            .await
            .unwrap();
        assert_eq!(bound.data(), &json!({ "user": "admin", "password": "hunter2" }));
    }

    #[tokio::test]
    async fn secret_errors() {
        let binder = binder();
        binder
            .store()
            .insert(&secret("my-secret", 1, &[("config", "not json")]))
            .unwrap();
        let ctx = Context::background();

        let err = binder
            .resolve_data_import(&ctx, "", "default", &secret_import(Some("missing")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = binder
            .resolve_data_import(&ctx, "", "default", &secret_import(Some("config")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let err = binder
            .resolve_data_import(&ctx, "", "other", &secret_import(Some("config")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn config_map_in_other_namespace() {
        let binder = binder();
        binder
            .store()
            .insert(&ConfigMap {
                metadata: ObjectMeta {
                    name: Some("cm".to_owned()),
                    namespace: Some("shared".to_owned()),
                    generation: Some(7),
                    ..Default::default()
                },
                data: Some([("values".to_owned(), "[1, 2]".to_owned())].into_iter().collect()),
                ..Default::default()
            })
            .unwrap();
        let import = DataImport {
            name: "values".to_owned(),
            config_map_ref: Some(ConfigMapReference {
                name: "cm".to_owned(),
                namespace: Some("shared".to_owned()),
                key: Some("values".to_owned()),
            }),
            ..Default::default()
        };

        let (bound, _) = binder
            .resolve_data_import(&Context::background(), "", "default", &import)
            .await
            .unwrap();
        assert_eq!(bound.data(), &json!([1, 2]));
        assert_eq!(bound.generation(), 7);
    }

    #[tokio::test]
    async fn config_map_merges_binary_data() {
        let binder = binder();
        binder
            .store()
            .insert(&ConfigMap {
                metadata: ObjectMeta {
                    name: Some("cm".to_owned()),
                    namespace: Some("default".to_owned()),
                    generation: Some(3),
                    ..Default::default()
                },
                data: Some([("mode".to_owned(), "fast".to_owned())].into_iter().collect()),
                binary_data: Some(
                    [("settings".to_owned(), ByteString(br#"{"x":1}"#.to_vec()))]
                        .into_iter()
                        .collect(),
                ),
                ..Default::default()
            })
            .unwrap();
        let import = |key: Option<&str>| DataImport {
            name: "cm".to_owned(),
            config_map_ref: Some(ConfigMapReference {
                name: "cm".to_owned(),
                key: key.map(str::to_owned),
                ..Default::default()
            }),
            ..Default::default()
        };
        let ctx = Context::background();

        let (bound, _) = binder
            .resolve_data_import(&ctx, "", "default", &import(None))
            .await
            .unwrap();
        assert_eq!(
            bound.data(),
            &json!({ "mode": "fast", "settings": r#"{"x":1}"# })
        );
        assert_eq!(bound.generation(), 3);

        let (bound, _) = binder
            .resolve_data_import(&ctx, "", "default", &import(Some("settings")))
            .await
            .unwrap();
        assert_eq!(bound.data(), &json!({ "x": 1 }));
    }

    #[tokio::test]
    async fn ambiguous_import_never_reads() {
        let binder = binder();
        let import = DataImport {
            name: "both".to_owned(),
            data_ref: Some("a".to_owned()),
            secret_ref: Some(SecretReference::default()),
            ..Default::default()
        };
        let err = binder
            .resolve_data_import(&Context::background(), "", "default", &import)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
