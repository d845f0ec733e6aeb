use std::{
	collections::BTreeMap,
	sync::{PoisonError, RwLock},
};

use async_trait::async_trait;
use labelselector::Selector;

use super::{Store, StoreObject};
use crate::{kubemodel::ObjectLocation, Error, Result};

// (kind, namespace, name)
type Key = (String, String, String);

/// In-process store, objects are kept serialized like the api server does
#[derive(Debug, Default)]
pub struct MemoryStore {
	objects: RwLock<BTreeMap<Key, serde_json::Value>>,
}

fn key<K: StoreObject>(namespace: &str, name: &str) -> Key {
	(K::kind(&()).into_owned(), namespace.to_owned(), name.to_owned())
}

fn decode<K: StoreObject>(value: &serde_json::Value, location: &ObjectLocation) -> Result<K> {
	K::deserialize(value).map_err(|e| Error::InvalidData {
		origin: format!("{} {}", K::kind(&()), location),
		message: e.to_string(),
	})
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace object, it must have both name and namespace set
	pub fn insert<K: StoreObject>(&self, object: &K) -> Result<()> {
		let meta = object.meta();
		let (namespace, name) = match (&meta.namespace, &meta.name) {
			(Some(namespace), Some(name)) => (namespace, name),
			_ => {
				return Err(Error::Configuration(format!(
					"{} needs both name and namespace to be stored",
					K::kind(&())
				)))
			}
		};
		let value = serde_json::to_value(object).map_err(|e| Error::InvalidData {
			origin: format!("{} {}", K::kind(&()), ObjectLocation::new(namespace, name)),
			message: e.to_string(),
		})?;
		self.objects
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(key::<K>(namespace, name), value);
		Ok(())
	}

	pub fn remove<K: StoreObject>(&self, namespace: &str, name: &str) -> bool {
		self.objects
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&key::<K>(namespace, name))
			.is_some()
	}
}

#[async_trait]
impl Store for MemoryStore {
	async fn get<K: StoreObject>(&self, namespace: &str, name: &str) -> Result<K> {
		let location = ObjectLocation::new(namespace, name);
		let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
		match objects.get(&key::<K>(namespace, name)) {
			Some(value) => decode(value, &location),
			None => Err(Error::not_found(K::kind(&()), location.to_string())),
		}
	}

	async fn list<K: StoreObject>(&self, namespace: &str, selector: &Selector) -> Result<Vec<K>> {
		let kind = K::kind(&()).into_owned();
		let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
		let mut out = Vec::new();
		for ((object_kind, object_namespace, name), value) in objects.iter() {
			if *object_kind != kind || object_namespace != namespace {
				continue;
			}
			let object: K = decode(value, &ObjectLocation::new(namespace, name.as_str()))?;
			if selector.matches(&object.meta().labels) {
				out.push(object);
			}
		}
		Ok(out)
	}
}
