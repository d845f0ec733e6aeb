use async_trait::async_trait;
use kube::{
	api::{Api, ListParams},
	Client,
};
use labelselector::Selector;

use super::{Store, StoreObject};
use crate::{kubemodel::ObjectLocation, Error, Result};

/// Store backed by the kubernetes api server
#[derive(Clone)]
pub struct KubeStore {
	client: Client,
}

impl KubeStore {
	pub fn new(client: Client) -> Self {
		Self { client }
	}

	/// Client configured from kubeconfig or in-cluster environment
	pub async fn try_default() -> Result<Self> {
		Ok(Self::new(Client::try_default().await?))
	}
}

#[async_trait]
impl Store for KubeStore {
	async fn get<K: StoreObject>(&self, namespace: &str, name: &str) -> Result<K> {
		log::trace!("Get {} {}/{}", K::kind(&()), namespace, name);
		let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
		match api.get(name).await {
			Ok(v) => Ok(v),
			Err(kube::Error::Api(apierror)) if apierror.code == 404 => Err(Error::not_found(
				K::kind(&()),
				ObjectLocation::new(namespace, name).to_string(),
			)),
			Err(e) => Err(e.into()),
		}
	}

	async fn list<K: StoreObject>(&self, namespace: &str, selector: &Selector) -> Result<Vec<K>> {
		let selector = selector.to_string();
		log::trace!("List {} in {} with {:?}", K::kind(&()), namespace, selector);
		let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
		let list = api.list(&ListParams::default().labels(&selector)).await?;
		Ok(list.items)
	}
}
