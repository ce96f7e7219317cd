use std::sync::Arc;

use filer_service::FilerService;

use crate::store::RegistryStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FilerService>,
}
impl AppState {
	pub fn new(config: filer_config::Config) -> color_eyre::Result<Self> {
		let store = Arc::new(RegistryStore::load(&config.registry.path)?);
		let service = FilerService::new(config, store.clone(), store);

		Ok(Self { service: Arc::new(service) })
	}
}
