//! Read access to namespaced cluster objects.

mod kubernetes;
mod memory;

pub use kubernetes::KubeStore;
pub use memory::MemoryStore;

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use labelselector::Selector;
use serde::{de::DeserializeOwned, Serialize};

use crate::Result;

/// Anything the store can hand out
pub trait StoreObject:
	kube::Resource<DynamicType = (), Scope = NamespaceResourceScope>
	+ Clone
	+ Debug
	+ Serialize
	+ DeserializeOwned
	+ Send
	+ Sync
	+ 'static
{
}
impl<K> StoreObject for K where
	K: kube::Resource<DynamicType = (), Scope = NamespaceResourceScope>
		+ Clone
		+ Debug
		+ Serialize
		+ DeserializeOwned
		+ Send
		+ Sync
		+ 'static
{
}

/// Point and range reads, nothing here ever writes
#[async_trait]
pub trait Store: Send + Sync {
	/// Fails with `Error::NotFound` when object is absent
	async fn get<K: StoreObject>(&self, namespace: &str, name: &str) -> Result<K>;
	async fn list<K: StoreObject>(&self, namespace: &str, selector: &Selector) -> Result<Vec<K>>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for &S {
	async fn get<K: StoreObject>(&self, namespace: &str, name: &str) -> Result<K> {
		(**self).get(namespace, name).await
	}
	async fn list<K: StoreObject>(&self, namespace: &str, selector: &Selector) -> Result<Vec<K>> {
		(**self).list(namespace, selector).await
	}
}
